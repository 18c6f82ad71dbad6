use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Serde: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Reqwest: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Parse: {0}")]
    Parse(#[from] url::ParseError),

    #[error("Api: {0}")]
    Api(#[from] ApiError),

    #[error("Studio: id must be defined to update a channel")]
    MissingId,
}

/// Error shape returned by the studio API.
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiError {
    pub detail: String,
}

impl ApiError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl std::error::Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.detail)
    }
}
