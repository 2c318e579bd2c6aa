use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Loader,
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("unknown item {0}")]
    UnknownItem(ItemId),
    #[error("invalid grid option `{field}`: {message}")]
    InvalidOption { field: &'static str, message: String },
    #[error("item loader failed: {0}")]
    Loader(String),
}

impl GridError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownItem(_) => ErrorCode::NotFound,
            Self::InvalidOption { .. } => ErrorCode::Validation,
            Self::Loader(_) => ErrorCode::Loader,
        }
    }
}

/// Serialisable form of a [`GridError`], carried on the event channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&GridError> for GridErrorReport {
    fn from(value: &GridError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}
