// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

use std::time::Duration;

use thiserror::Error;

/// Failure of a single URL render. Absorbed by the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Backend returned status {status_code}: {body}")]
    Backend { status_code: u16, body: String },
    #[error("No response from backend after {after:?}")]
    Timeout { after: Duration },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MergeError {
    #[error("Nothing to merge")]
    NoInput,
    #[error("None of the {inputs} documents could be merged")]
    NoPages { inputs: usize },
    #[error("Failed to load document: {0}")]
    Load(String),
    #[error("Failed to serialize merged document: {0}")]
    Serialize(String),
}

/// Errors that reach the HTTP layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    InvalidJob(String),
    #[error("Failed to generate any PDFs ({attempted} attempted), last error: {last_error}")]
    NoOutput {
        attempted: usize,
        last_error: String,
    },
}

impl PipelineError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PipelineError::Configuration(_) => "CONFIGURATION_ERROR",
            PipelineError::InvalidJob(_) => "INVALID_JOB",
            PipelineError::NoOutput { .. } => "NO_OUTPUT",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            PipelineError::Configuration(_) => 500,
            PipelineError::InvalidJob(_) => 400,
            PipelineError::NoOutput { .. } => 500,
        }
    }
}
