use std::error::Error;
use std::fmt;

/// Custom error type for pipeline failures that callers match on.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// No ancestor of the starting directory contains a `.git` marker.
    RootNotFound,
    /// A label value was not part of the encoder's fitted vocabulary.
    UnseenLabel(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineError::RootNotFound => {
                write!(f, "No Git root directory found above the working directory")
            }
            PipelineError::UnseenLabel(label) => {
                write!(f, "Label '{}' was not seen when fitting the encoder", label)
            }
        }
    }
}

impl Error for PipelineError {}
