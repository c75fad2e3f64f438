use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}
