use thiserror::Error;

pub type EcdnResult<T> = Result<T, EcdnError>;

#[derive(Debug, Error)]
pub enum EcdnError {
    #[error("unauthorized: invalid or missing API key")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad input: {0}")]
    BadInput(String),

    #[error("key initialization failed: {0}")]
    KeyInit(String),

    #[error("secure randomness unavailable: {0}")]
    Randomness(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EcdnError {
    /// Short, stable label for logs and metrics. Never contains paths or key material.
    pub fn kind(&self) -> &'static str {
        match self {
            EcdnError::Unauthorized => "unauthorized",
            EcdnError::NotFound(_) => "not_found",
            EcdnError::BadInput(_) => "bad_input",
            EcdnError::KeyInit(_) => "key_init",
            EcdnError::Randomness(_) => "randomness",
            EcdnError::Encryption(_) => "encryption",
            EcdnError::Decryption(_) => "decryption",
            EcdnError::Config(_) => "config",
            EcdnError::Io(_) => "io",
            EcdnError::Other(_) => "other",
        }
    }
}
