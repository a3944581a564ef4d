use thiserror::Error;

/// Why a playlist fetch produced no page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Rejected locally, nothing was sent
    #[error("Invalid playlist request: {reason}")]
    InvalidRequest { reason: String },

    /// The API answered with a non-200 status
    #[error("YouTube API rejected the request with status {status_code}")]
    RemoteRejected { status_code: u16 },

    /// DNS, connection or body read failure
    #[error("Failed to reach YouTube API: {cause}")]
    TransportFailure { cause: String },

    /// Body was not the expected JSON shape
    #[error("Failed to decode playlist response: {cause}")]
    DecodeFailure { cause: String },
}
