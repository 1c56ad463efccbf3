use std::sync::atomic::Ordering;

use serde_json::json;

use crate::routes::{error_response, json_ok, HttpResponse};
use crate::state::{lock, RunStatus, SharedState};

// ---------------------------------------------------------------------------
// POST /step
// ---------------------------------------------------------------------------

/// Advances the session's training process by exactly one unit step.
pub fn handle_step(state: SharedState) -> HttpResponse {
    let mut st = lock(&state);
    if st.network.is_none() {
        return error_response(404, "no network has been created or imported yet");
    }
    if st.is_running() {
        return error_response(409, "a training stream is running; stop it first");
    }
    match st.advance() {
        Some(event) => json_ok(&event),
        None => json_ok(&json!({ "done": true, "steps": st.steps_taken })),
    }
}

// ---------------------------------------------------------------------------
// POST /compute
// ---------------------------------------------------------------------------

/// Runs one complete forward pass and reports the outputs and error.
///
/// This does not move the session's training process; use the event stream
/// with `mode=compute` to watch a forward pass step by step.
pub fn handle_compute(state: SharedState) -> HttpResponse {
    let mut st = lock(&state);
    if st.is_running() {
        return error_response(409, "a training stream is running; stop it first");
    }
    let Some(network) = st.network.as_mut() else {
        return error_response(404, "no network has been created or imported yet");
    };
    let outputs = network.forward();
    json_ok(&json!({ "outputs": outputs, "err": network.err() }))
}

// ---------------------------------------------------------------------------
// POST /train/stop, POST /train/restart
// ---------------------------------------------------------------------------

pub fn handle_stop(state: SharedState) -> HttpResponse {
    let st = lock(&state);
    if let RunStatus::Running { stop_flag } = &st.run {
        stop_flag.store(true, Ordering::Relaxed);
    }
    json_ok(&json!({ "stopping": st.is_running() }))
}

/// Discards the training position; the next step starts a new forward pass.
pub fn handle_restart(state: SharedState) -> HttpResponse {
    let mut st = lock(&state);
    if st.is_running() {
        return error_response(409, "a training stream is running; stop it first");
    }
    st.restart();
    json_ok(&json!({ "steps": 0 }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, Mutex};

    use neurostep::Network;

    use crate::state::StudioState;

    fn shared(network: Option<Network>) -> SharedState {
        let mut st = StudioState::new();
        if let Some(network) = network {
            st.install(network);
        }
        Arc::new(Mutex::new(st))
    }

    fn network() -> Network {
        let mut net = Network::new(vec![0.3, 0.7], vec![1.0], &[2, 1], vec![0.1, 0.2]);
        net.set_activation("sigmoid");
        net
    }

    fn mark_running(state: &SharedState) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(false));
        lock(state).run = RunStatus::Running { stop_flag: flag.clone() };
        flag
    }

    #[test]
    fn step_requires_a_network() {
        let state = shared(None);
        assert_eq!(handle_step(state).status_code().0, 404);
    }

    #[test]
    fn step_advances_the_shared_process() {
        let state = shared(Some(network()));
        assert_eq!(handle_step(state.clone()).status_code().0, 200);
        assert_eq!(handle_step(state.clone()).status_code().0, 200);
        assert_eq!(lock(&state).steps_taken, 2);
    }

    #[test]
    fn a_running_stream_blocks_step_compute_and_restart() {
        let state = shared(Some(network()));
        handle_step(state.clone());
        mark_running(&state);

        assert_eq!(handle_step(state.clone()).status_code().0, 409);
        assert_eq!(handle_compute(state.clone()).status_code().0, 409);
        assert_eq!(handle_restart(state.clone()).status_code().0, 409);
        assert_eq!(lock(&state).steps_taken, 1);
    }

    #[test]
    fn stop_raises_the_flag() {
        let state = shared(Some(network()));
        let flag = mark_running(&state);
        assert_eq!(handle_stop(state).status_code().0, 200);
        assert!(flag.load(Ordering::Relaxed));
    }

    #[test]
    fn restart_when_idle_resets_the_count() {
        let state = shared(Some(network()));
        handle_step(state.clone());
        assert_eq!(handle_restart(state.clone()).status_code().0, 200);
        assert_eq!(lock(&state).steps_taken, 0);
    }
}
