use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Relay index {index} out of range, board has {relay_count} relays")]
    OutOfRange { index: usize, relay_count: usize },

    #[error("Invalid relay count {0}, expected 1..=254")]
    InvalidRelayCount(usize),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<hidapi::HidError> for RelayError {
    fn from(e: hidapi::HidError) -> Self {
        RelayError::Transport(e.to_string())
    }
}
