use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("SDK error: {0}")]
    Sdk(#[from] rtc_access::SdkError),

    #[error("Token error: {0}")]
    Token(#[from] rtc_access::TokenError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rtc_access::ConfigError> for CliError {
    fn from(error: rtc_access::ConfigError) -> Self {
        CliError::Config(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
