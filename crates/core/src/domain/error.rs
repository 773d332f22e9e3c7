// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid probe definition: {0}")]
    InvalidProbe(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
