//! Error types for the streaming envelope codec.

use std::fmt;

use serde_json::Value;

/// Errors surfaced while scanning a streaming response body.
///
/// `Malformed` is recoverable (the scan continues with the next frame);
/// `Incomplete` and `Trailer` end the scan. Events already yielded before
/// an error stand.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamDecodeError {
    /// A frame header declared more payload bytes than the buffer holds.
    Incomplete { declared: usize, available: usize },
    /// One frame's payload was not valid JSON. Carries the raw payload
    /// for diagnostics.
    Malformed { payload: Vec<u8> },
    /// The end-of-stream trailer carried an explicit error member.
    Trailer { detail: Value },
}

impl fmt::Display for StreamDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamDecodeError::Incomplete {
                declared,
                available,
            } => write!(
                f,
                "incomplete frame: declared {declared} payload bytes, {available} available"
            ),
            StreamDecodeError::Malformed { payload } => write!(
                f,
                "malformed frame payload: {}",
                String::from_utf8_lossy(payload)
            ),
            StreamDecodeError::Trailer { detail } => {
                write!(f, "stream ended with error trailer: {detail}")
            }
        }
    }
}

impl std::error::Error for StreamDecodeError {}
