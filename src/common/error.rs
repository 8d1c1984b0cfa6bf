use rust_tokenizers::error::TokenizerError;
#[cfg(feature = "torch")]
use tch::TchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("Model not found error: {0}")]
    ModelNotFoundError(String),

    #[error("Model load error: {0}")]
    LoadError(String),

    #[error("Translation error: {0}")]
    TranslationError(String),

    #[error("Tokenizer error: {0}")]
    TokenizerError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Invalid configuration error: {0}")]
    InvalidConfigurationError(String),

    #[error("Worker error: {0}")]
    WorkerError(String),

    #[cfg(feature = "torch")]
    #[error("Tch tensor error: {0}")]
    TchError(String),
}

impl From<std::io::Error> for TranslatorError {
    fn from(error: std::io::Error) -> Self {
        TranslatorError::IOError(error.to_string())
    }
}

impl From<serde_json::Error> for TranslatorError {
    fn from(error: serde_json::Error) -> Self {
        TranslatorError::InvalidConfigurationError(error.to_string())
    }
}

impl From<TokenizerError> for TranslatorError {
    fn from(error: TokenizerError) -> Self {
        TranslatorError::TokenizerError(error.to_string())
    }
}

#[cfg(feature = "torch")]
impl From<TchError> for TranslatorError {
    fn from(error: TchError) -> Self {
        TranslatorError::TchError(error.to_string())
    }
}
