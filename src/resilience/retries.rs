//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether an upstream answer is delivered or retried
//! - Allow exactly one refresh-and-retry per inbound request, on 401 only
//!
//! # State Transitions
//! ```text
//! Sent ──401──▶ Unauthorized ──refresh──▶ RefreshedAndRetried ──any──▶ Done
//!   │                                                                  ▲
//!   └──────────────── non-401 / transport error ───────────────────────┘
//! ```
//!
//! # Design Decisions
//! - Non-401 statuses are never retried
//! - A second 401 is delivered as-is, so a bad credential cannot loop
//! - Transport errors end the request; the caller maps them to 502

use axum::http::StatusCode;

/// Where an inbound request is in its attempt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// First attempt in flight.
    Sent,
    /// First attempt came back 401; a refresh is due.
    Unauthorized,
    /// Credential refreshed, second attempt in flight.
    RefreshedAndRetried,
    /// Outcome decided.
    Done,
}

/// What the forwarding loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Return the response to the caller.
    Deliver,
    /// Refresh the credential, then send the same request once more.
    RefreshAndRetry,
}

/// Two-attempt state machine for the 401 refresh protocol.
#[derive(Debug, Clone)]
pub struct AuthRetry {
    state: AttemptState,
    attempts: u32,
}

impl AuthRetry {
    pub fn new() -> Self {
        Self {
            state: AttemptState::Sent,
            attempts: 1,
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Number of sends made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Feed the status of the attempt that just completed.
    pub fn on_response(&mut self, status: StatusCode) -> Step {
        match self.state {
            AttemptState::Sent if status == StatusCode::UNAUTHORIZED => {
                self.state = AttemptState::Unauthorized;
                Step::RefreshAndRetry
            }
            AttemptState::Unauthorized => {
                tracing::error!("Response observed before the pending refresh; delivering it");
                self.state = AttemptState::Done;
                Step::Deliver
            }
            _ => {
                self.state = AttemptState::Done;
                Step::Deliver
            }
        }
    }

    /// The refresh finished (successfully or not); the retry is about to be sent.
    pub fn on_refreshed(&mut self) {
        if self.state == AttemptState::Unauthorized {
            self.state = AttemptState::RefreshedAndRetried;
            self.attempts += 1;
        }
    }

    /// The attempt failed below HTTP.
    pub fn on_transport_error(&mut self) {
        self.state = AttemptState::Done;
    }
}

impl Default for AuthRetry {
    fn default() -> Self {
        Self::new()
    }
}
