//! Wire types for the WhatsApp bridge HTTP API.
//!
//! This crate contains the serde-serializable shapes exchanged with the
//! bridge's `/api` endpoints. Types here are pure data: the only behavior
//! beyond (de)serialization is deriving the link phase from a status snapshot
//! and enforcing the status invariants.
//!
//! # Main Types
//!
//! - [`ConnectionState`] - snapshot returned by `GET /api/status`
//! - [`LinkPhase`] - the three-state view of a snapshot
//! - [`ApiResponse`] - envelope returned by every command endpoint
//! - [`SendMessageRequest`], [`DownloadMediaRequest`] - command bodies

pub mod request;
pub mod status;

pub use request::*;
pub use status::*;
