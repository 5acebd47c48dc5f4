use openssl::error::ErrorStack;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid JSON message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base64 field: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("malformed message: {0}")]
    Format(&'static str),

    #[error("challenge mismatch")]
    Challenge,

    #[error("origin mismatch")]
    Origin,

    #[error("crypto failure: {0}")]
    Crypto(String),

    #[error("signature did not verify")]
    Signature,

    #[error("required session field not set: {0}")]
    Unconfigured(&'static str),
}

impl From<ErrorStack> for Error {
    fn from(err: ErrorStack) -> Error {
        Error::Crypto(err.to_string())
    }
}
