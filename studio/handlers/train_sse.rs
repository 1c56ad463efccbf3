use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tiny_http::Request;

use neurostep::train::ForwardPass;

use crate::state::{advance_observed, lock, RunStatus, SharedState};
use crate::util::query::{parse_query, query_get};
use crate::util::sse::{format_sse_event, write_sse, SSE_PREAMBLE};

const DEFAULT_PAUSE_MS: u64 = 250;

/// Which sequence a stream drives.
#[derive(Clone, Copy, PartialEq)]
enum Mode {
    /// One forward pass, then `done`.
    Compute,
    /// The session's training process; runs until stopped or `max_steps`.
    Train,
}

/// `GET /train/events?mode=&pause_ms=&max_steps=`
///
/// Takes ownership of `request` so it can write the event stream straight to
/// the socket.  Each committed unit step is sent as an `event: step` frame
/// carrying a `StepEvent`, with a pause between steps so a browser can animate
/// the network.  The stream ends with `event: done` when the sequence is
/// exhausted or the step limit is reached, or `event: stopped` after
/// `POST /train/stop`.  The state lock is never held across the pause.
pub fn handle(request: Request, query: &str, state: SharedState) {
    let pairs = parse_query(query);
    let mode = match pairs.iter().find(|(k, _)| k == "mode").map(|(_, v)| v.as_str()) {
        Some("compute") => Mode::Compute,
        _ => Mode::Train,
    };
    let pause = Duration::from_millis(query_get(&pairs, "pause_ms").unwrap_or(DEFAULT_PAUSE_MS));
    let max_steps: Option<usize> = query_get(&pairs, "max_steps");

    // Claim the session before answering; a second stream gets a plain 409.
    let stop_flag = {
        let mut st = lock(&state);
        let refusal = if st.network.is_none() {
            Some((404, "no network has been created or imported yet"))
        } else if st.is_running() {
            Some((409, "a training stream is already running"))
        } else {
            None
        };
        if let Some((status, message)) = refusal {
            drop(st);
            let _ = request.respond(crate::routes::error_response(status, message));
            return;
        }
        let flag = Arc::new(AtomicBool::new(false));
        st.run = RunStatus::Running { stop_flag: flag.clone() };
        flag
    };

    let mut writer = request.into_writer();
    if !write_sse(&mut writer, SSE_PREAMBLE) {
        lock(&state).run = RunStatus::Idle;
        return;
    }
    tracing::info!(?max_steps, pause_ms = pause.as_millis() as u64, "event stream started");

    let mut pass = ForwardPass::new();
    let mut taken = 0usize;
    let final_event = loop {
        if stop_flag.load(Ordering::Relaxed) {
            break "stopped";
        }
        if max_steps.map_or(false, |limit| taken >= limit) {
            break "done";
        }

        let event = {
            let mut st = lock(&state);
            match mode {
                Mode::Train => st.advance(),
                Mode::Compute => match st.network.as_mut() {
                    Some(network) => advance_observed(network, &mut pass, taken + 1),
                    None => None,
                },
            }
        };
        let Some(event) = event else {
            break "done";
        };
        taken += 1;

        let payload = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(_) => continue,
        };
        if !write_sse(&mut writer, &format_sse_event("step", &payload)) {
            tracing::debug!(taken, "event stream client disconnected");
            lock(&state).run = RunStatus::Idle;
            return;
        }
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
    };

    let summary = {
        let mut st = lock(&state);
        st.run = RunStatus::Idle;
        let err = st.network.as_ref().map(|n| n.err()).unwrap_or(0.0);
        json!({ "steps": taken, "total_steps": st.steps_taken, "err": err })
    };
    tracing::info!(taken, outcome = final_event, "event stream finished");
    let _ = write_sse(&mut writer, &format_sse_event(final_event, &summary.to_string()));
}
