use thiserror::Error;

use crate::types::ValidationErrors;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("API error: {0}")]
    Api(String),

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for AdminError {
    fn from(err: reqwest::Error) -> Self {
        AdminError::Api(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
