#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("todo not found")]
    NotFound,
    /// Any other unexpected status; `message` is the server's `error` field
    /// when the body carried one.
    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not read response: {0}")]
    Decode(String),
    #[error("could not encode request: {0}")]
    Encode(String),
    #[error("could not reach server: {0}")]
    Transport(String),
}
