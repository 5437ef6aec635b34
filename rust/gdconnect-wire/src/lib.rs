#![deny(unsafe_code)]

//! Connect-over-HTTP wire contract.
//!
//! This crate is the canonical implementation of the protocol the
//! generated GDScript runtime speaks:
//!
//! - [`request`] builds a [`request::RequestPlan`] for each of the
//!   three call shapes (idempotent GET, mutating POST, enveloped
//!   streaming POST);
//! - [`envelope`] is the streaming envelope codec: encode one frame,
//!   scan a response body for a sequence of frames.
//!
//! The GDScript emitter pulls its header names, content types, and flag
//! bits from here, so the emitted runtime and this codec cannot drift
//! apart.

pub mod envelope;
pub mod error;
pub mod request;

pub use envelope::{EnvelopeFlags, FrameScanner, encode_frame};
pub use error::StreamDecodeError;
pub use request::{RequestPlan, plan};

/// Content type for unary calls.
pub const CONTENT_TYPE_JSON: &str = "application/json";
/// Content type for streaming calls (Connect enveloped JSON).
pub const CONTENT_TYPE_CONNECT_JSON: &str = "application/connect+json";
/// Protocol version header sent on streaming calls.
pub const HEADER_PROTOCOL_VERSION: &str = "Connect-Protocol-Version";
/// Value of [`HEADER_PROTOCOL_VERSION`].
pub const PROTOCOL_VERSION: &str = "1";
/// Default development base URL for generated clients.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
