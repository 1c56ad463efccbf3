use std::io::Cursor;
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::state::SharedState;
use crate::handlers;

pub type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn headers(pairs: &[(&str, &str)]) -> Vec<Header> {
    pairs.iter()
        .filter_map(|(k, v)| Header::from_bytes(k.as_bytes(), v.as_bytes()).ok())
        .collect()
}

fn bytes_response(status: u16, body: Vec<u8>, header_pairs: &[(&str, &str)]) -> HttpResponse {
    let len = body.len();
    Response::new(
        StatusCode(status),
        headers(header_pairs),
        Cursor::new(body),
        Some(len),
        None,
    )
}

pub fn json_response(status: u16, body: String) -> HttpResponse {
    bytes_response(status, body.into_bytes(), &[("Content-Type", "application/json")])
}

/// Serializes `value` as a 200 JSON response.
pub fn json_ok<T: Serialize>(value: &T) -> HttpResponse {
    match serde_json::to_string(value) {
        Ok(body) => json_response(200, body),
        Err(e) => error_response(500, &e.to_string()),
    }
}

/// `{"error": message}` with the given status.
pub fn error_response(status: u16, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "error": message }).to_string();
    json_response(status, body)
}

pub fn json_download_response(body: String, filename: &str) -> HttpResponse {
    let disposition = format!("attachment; filename=\"{}\"", filename);
    bytes_response(
        200,
        body.into_bytes(),
        &[
            ("Content-Type", "application/json"),
            ("Content-Disposition", disposition.as_str()),
        ],
    )
}

pub fn not_found() -> HttpResponse {
    bytes_response(404, b"404 Not Found".to_vec(), &[("Content-Type", "text/plain")])
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// All handlers (except SSE) receive a `&mut Request` so that the dispatcher
/// retains ownership and can call `request.respond(response)` at the end.
/// The SSE handler takes ownership to perform long-lived streaming.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();

    let (path, query) = match url.split_once('?') {
        Some((p, q)) => (p.to_owned(), q.to_owned()),
        None => (url.clone(), String::new()),
    };
    tracing::debug!(%method, %path, "request");

    // SSE is long-lived; the handler takes ownership and drives the stream loop.
    if method == Method::Get && path == "/train/events" {
        handlers::train_sse::handle(request, &query, state);
        return;
    }

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    let response = match (method, segments.as_slice()) {
        // ── Network lifecycle ─────────────────────────────────────────────
        (Method::Get,  ["network"])             => handlers::network::handle_get(state),
        (Method::Get,  ["network", "download"]) => handlers::network::handle_download(state),
        (Method::Post, ["network"])             => handlers::network::handle_create(&mut request, state),
        (Method::Post, ["network", "import"])   => handlers::network::handle_import(&mut request, state),
        (Method::Post, ["network", "update"])   => handlers::network::handle_update(&mut request, state),
        (Method::Post, ["network", "rand"])     => handlers::network::handle_rand(state),
        (Method::Post, ["network", "clear"])    => handlers::network::handle_clear(state),

        // ── Manual editing ────────────────────────────────────────────────
        (Method::Post, ["layers", index]) => match index.parse() {
            Ok(i) => handlers::edit::handle_layer(&mut request, state, i),
            Err(_) => not_found(),
        },
        (Method::Post, ["layers", index, "replace"]) => match index.parse() {
            Ok(i) => handlers::edit::handle_replace_layer(&mut request, state, i),
            Err(_) => not_found(),
        },
        (Method::Post, ["units", layer, unit]) => match (layer.parse(), unit.parse()) {
            (Ok(l), Ok(u)) => handlers::edit::handle_unit(&mut request, state, l, u),
            _ => not_found(),
        },

        // ── Stepping ──────────────────────────────────────────────────────
        (Method::Post, ["step"])             => handlers::steps::handle_step(state),
        (Method::Post, ["compute"])          => handlers::steps::handle_compute(state),
        (Method::Post, ["train", "stop"])    => handlers::steps::handle_stop(state),
        (Method::Post, ["train", "restart"]) => handlers::steps::handle_restart(state),

        // ── 404 ───────────────────────────────────────────────────────────
        _ => not_found(),
    };

    let _ = request.respond(response);
}
