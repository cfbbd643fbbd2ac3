use pixbot_capture::Point;
use std::time::Duration;
use thiserror::Error;

/// Ways a UI flow can end short of its goal.
///
/// Everything except `StashExhausted` is recoverable by the caller: the flow
/// reports `false` and the UI is left in a state a later attempt can start from.
#[derive(Debug, Error, PartialEq)]
pub enum FlowError {
    #[error("{what} not found within {:.1}s", .timeout.as_secs_f64())]
    NotFound { what: String, timeout: Duration },

    #[error("{what} detected at ({}, {}) is outside its expected position", .at.x, .at.y)]
    SanityCheckFailed { what: String, at: Point },

    #[error("service issues persisted over {attempts} start attempts")]
    TransientRetriesExhausted { attempts: u32 },

    #[error("all {pages} stash pages are full, operator intervention required")]
    StashExhausted { pages: usize },
}

impl FlowError {
    pub fn not_found(what: &str, timeout: Duration) -> Self {
        FlowError::NotFound {
            what: what.to_string(),
            timeout,
        }
    }

    /// Fatal errors must stop the bot instead of being turned into `false`.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FlowError::StashExhausted { .. })
    }
}
