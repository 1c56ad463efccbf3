use serde::Deserialize;
use tiny_http::Request;

use neurostep::math::numeric::{lenient_number, lenient_numbers};
use neurostep::{Network, NetworkSpec};

use crate::routes::{error_response, json_download_response, json_response, HttpResponse};
use crate::state::{lock, SharedState};
use crate::util::body::{read_body, read_json};

/// Renders the session network as its persisted document.
fn document_response(network: &Network) -> HttpResponse {
    match network.to_json() {
        Ok(json) => json_response(200, json),
        Err(e) => error_response(500, &e.to_string()),
    }
}

fn no_network() -> HttpResponse {
    error_response(404, "no network has been created or imported yet")
}

// ---------------------------------------------------------------------------
// GET /network, GET /network/download
// ---------------------------------------------------------------------------

pub fn handle_get(state: SharedState) -> HttpResponse {
    let st = lock(&state);
    match &st.network {
        Some(network) => document_response(network),
        None => no_network(),
    }
}

pub fn handle_download(state: SharedState) -> HttpResponse {
    let st = lock(&state);
    let Some(network) = &st.network else {
        return no_network();
    };
    match network.to_json_pretty() {
        Ok(json) => json_download_response(json, "network.json"),
        Err(e) => error_response(500, &e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// POST /network, POST /network/import
// ---------------------------------------------------------------------------

/// Builds a fresh network from a `NetworkSpec` body.
pub fn handle_create(request: &mut Request, state: SharedState) -> HttpResponse {
    let spec: NetworkSpec = match read_json(request) {
        Ok(spec) => spec,
        Err(e) => return error_response(400, &e),
    };
    if let Err(e) = spec.validate() {
        return error_response(400, &e.to_string());
    }

    let network = spec.build();
    let response = document_response(&network);
    let mut st = lock(&state);
    if st.is_running() {
        return error_response(409, "a training stream is running; stop it first");
    }
    st.install(network);
    response
}

/// Replaces the session network with a persisted document.
pub fn handle_import(request: &mut Request, state: SharedState) -> HttpResponse {
    let body = match read_body(request) {
        Ok(body) => body,
        Err(e) => return error_response(400, &e),
    };
    let network = match Network::from_json(&body) {
        Ok(network) => network,
        Err(e) => return error_response(400, &e.to_string()),
    };

    let response = document_response(&network);
    let mut st = lock(&state);
    if st.is_running() {
        return error_response(409, "a training stream is running; stop it first");
    }
    st.install(network);
    response
}

// ---------------------------------------------------------------------------
// POST /network/update
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct UpdateBody {
    #[serde(deserialize_with = "lenient_numbers")]
    inputs: Vec<f64>,
    #[serde(deserialize_with = "lenient_numbers")]
    expected_outputs: Vec<f64>,
    #[serde(deserialize_with = "lenient_number")]
    learning_rate: f64,
    #[serde(default, deserialize_with = "lenient_numbers")]
    biases: Vec<f64>,
    #[serde(rename = "fn", default)]
    activation: Option<String>,
}

/// Replaces inputs, targets, rate and the stored biases.  Layer biases are
/// left as they are; apply them with `POST /layers/{i}`.
pub fn handle_update(request: &mut Request, state: SharedState) -> HttpResponse {
    let body: UpdateBody = match read_json(request) {
        Ok(body) => body,
        Err(e) => return error_response(400, &e),
    };

    let mut st = lock(&state);
    let Some(network) = st.network.as_mut() else {
        return no_network();
    };
    network.update(body.inputs, body.expected_outputs, body.learning_rate, body.biases);
    if let Some(name) = &body.activation {
        network.set_activation(name);
    }
    document_response(network)
}

// ---------------------------------------------------------------------------
// POST /network/rand, POST /network/clear
// ---------------------------------------------------------------------------

pub fn handle_rand(state: SharedState) -> HttpResponse {
    let mut st = lock(&state);
    let Some(network) = st.network.as_mut() else {
        return no_network();
    };
    network.rand();
    document_response(network)
}

pub fn handle_clear(state: SharedState) -> HttpResponse {
    let mut st = lock(&state);
    let Some(network) = st.network.as_mut() else {
        return no_network();
    };
    network.clear_outputs();
    document_response(network)
}
