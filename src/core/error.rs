use thiserror::Error;

use crate::anatomy::attach::AttachError;

#[derive(Error, Debug)]
pub enum AnatomyError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Body plan not found: {0}")]
    PlanNotFound(String),

    #[error("Invalid body plan '{plan}': {reason}")]
    InvalidPlan { plan: String, reason: String },

    #[error(transparent)]
    Attach(#[from] AttachError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AnatomyError>;
