use cipher::CipherError;
use encode::EncodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessengerError {
    #[error("Invalid key size `{real}` bits, need an even size of at least `{min}` bits")]
    InvalidKeySize { min: usize, real: usize },

    #[error("The key file {0} not exist")]
    KeyNotExist(String),

    #[error("The file {0} already exists, use `--force` to overwrite it")]
    FileExists(String),

    #[error("{0}")]
    JsonParseFailed(String),

    #[error("Invalid key in {path}: {reason}")]
    InvalidKey { path: String, reason: String },

    #[error("Key does not exist for `{0}`")]
    EmailNotBound(String),

    #[error("Invalid public exponent: {0}")]
    InvalidExponent(String),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
