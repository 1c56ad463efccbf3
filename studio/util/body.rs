use std::io::Read;

use serde::de::DeserializeOwned;
use tiny_http::Request;

/// Reads the whole request body as UTF-8 text.
pub fn read_body(request: &mut Request) -> Result<String, String> {
    let mut body = String::new();
    request.as_reader()
        .read_to_string(&mut body)
        .map_err(|e| format!("could not read request body: {}", e))?;
    Ok(body)
}

/// Reads and deserializes a JSON request body.
pub fn read_json<T: DeserializeOwned>(request: &mut Request) -> Result<T, String> {
    let body = read_body(request)?;
    serde_json::from_str(&body).map_err(|e| format!("invalid JSON body: {}", e))
}
