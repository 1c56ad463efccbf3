use serde::Deserialize;
use serde_json::Value;
use tiny_http::Request;

use neurostep::math::numeric::{numbers_from_value, value_to_number};

use crate::routes::{error_response, json_ok, HttpResponse};
use crate::state::{lock, SharedState};
use crate::util::body::read_json;

// ---------------------------------------------------------------------------
// POST /layers/{i}
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct LayerEdit {
    bias: Option<Value>,
    #[serde(rename = "fn")]
    activation: Option<String>,
}

/// Broadcasts a bias and/or activation to every unit of layer `index`.
pub fn handle_layer(request: &mut Request, state: SharedState, index: usize) -> HttpResponse {
    let edit: LayerEdit = match read_json(request) {
        Ok(edit) => edit,
        Err(e) => return error_response(400, &e),
    };

    let mut st = lock(&state);
    let Some(layer) = st.network.as_mut().and_then(|n| n.layers.get_mut(index)) else {
        return error_response(404, &format!("no layer {}", index));
    };
    if let Some(bias) = &edit.bias {
        layer.set_bias(value_to_number(bias));
    }
    if let Some(name) = &edit.activation {
        layer.set_activation(name);
    }
    json_ok(layer)
}

// ---------------------------------------------------------------------------
// POST /layers/{i}/replace
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct LayerReplacement {
    unit_count: usize,
    #[serde(default)]
    bias: Option<Value>,
    #[serde(rename = "fn", default)]
    activation: String,
}

/// Swaps layer `index` for a fresh, unweighted layer.
pub fn handle_replace_layer(request: &mut Request, state: SharedState, index: usize) -> HttpResponse {
    let body: LayerReplacement = match read_json(request) {
        Ok(body) => body,
        Err(e) => return error_response(400, &e),
    };
    let bias = body.bias.as_ref().map(value_to_number).unwrap_or(0.0);

    let mut st = lock(&state);
    let Some(network) = st.network.as_mut() else {
        return error_response(404, "no network has been created or imported yet");
    };
    if let Err(e) = network.replace_layer(index, body.unit_count, bias, &body.activation) {
        return error_response(400, &e.to_string());
    }
    json_ok(&network.layers[index])
}

// ---------------------------------------------------------------------------
// POST /units/{l}/{u}
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct UnitEdit {
    bias: Option<Value>,
    /// An array or a comma-separated string; non-numbers become 0.
    weights: Option<Value>,
    #[serde(rename = "fn")]
    activation: Option<String>,
}

/// Manual edit of a single unit.
pub fn handle_unit(
    request: &mut Request,
    state: SharedState,
    layer_index: usize,
    unit_index: usize,
) -> HttpResponse {
    let edit: UnitEdit = match read_json(request) {
        Ok(edit) => edit,
        Err(e) => return error_response(400, &e),
    };

    let mut st = lock(&state);
    let Some(unit) = st.network.as_mut().and_then(|n| n.unit_mut(layer_index, unit_index)) else {
        return error_response(404, &format!("no unit {}/{}", layer_index, unit_index));
    };
    if let Some(bias) = &edit.bias {
        unit.bias = value_to_number(bias);
    }
    if let Some(weights) = &edit.weights {
        unit.set_weights(numbers_from_value(weights));
    }
    if let Some(name) = edit.activation {
        unit.activation = name;
    }
    json_ok(unit)
}
