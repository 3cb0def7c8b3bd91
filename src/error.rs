//! Host setup errors
//!
//! The simulation itself never fails. These cover the browser wiring around
//! it; callers log them and keep running without the missing feature.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("no global window")]
    NoWindow,
    #[error("no document on window")]
    NoDocument,
    #[error("element #{0} not found")]
    MissingElement(String),
    #[error("element #{0} is not a canvas")]
    NotACanvas(String),
    #[error("2d canvas context unavailable")]
    NoContext2d,
    #[error("local storage unavailable")]
    StorageUnavailable,
    #[error("audio context unavailable")]
    AudioUnavailable,
}
