//! Error types shared by the navigator and the extraction engine

use std::io;

/// A path append was rejected because the result would not fit.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("path would need {needed} bytes but capacity is {capacity}")]
pub struct CapacityError {
    pub needed: usize,
    pub capacity: usize,
}

#[derive(thiserror::Error, Debug)]
pub enum NavError {
    /// The interactive surface failed to draw or to read an input event.
    #[error("display surface error: {0}")]
    Surface(#[source] io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, NavError>;
