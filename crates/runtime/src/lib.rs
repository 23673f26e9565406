//! WhatsApp bridge runtime - bridge client and connection monitor.
//!
//! This crate drives the link between a WhatsApp bridge and a presentation
//! layer:
//!
//! - **Bridge control**: the [`BridgeControl`] trait (status, connect,
//!   disconnect) and its HTTP implementation [`BridgeClient`]
//! - **Connection monitor**: [`ConnectionMonitor`] keeps the latest
//!   [`ConnectionState`](wa_protocol::ConnectionState), polls in the
//!   background, and runs the fast-poll sub-phase while a QR scan is pending
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │    wa-cli    │  Presentation (status, connect, watch, ...)
//! └──────┬───────┘
//!        │ state(), subscribe(), connect(), disconnect()
//! ┌──────▼───────┐
//! │  wa-runtime  │  This crate
//! │  ┌────────┐  │
//! │  │Monitor │  │  Poll timers, state snapshot, in-flight flags
//! │  └───┬────┘  │
//! │  ┌───▼────┐  │
//! │  │ Bridge │  │  HTTP calls to /api/{status,connect,disconnect,...}
//! │  └────────┘  │
//! └──────────────┘
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod monitor;

pub use bridge::{BridgeClient, BridgeControl, DEFAULT_BRIDGE_URL, DEFAULT_REQUEST_TIMEOUT};
pub use config::MonitorConfig;
pub use error::{Error, FailureKind, MonitorError, Operation, Result};
pub use monitor::{ConnectOutcome, ConnectionMonitor, DisconnectOutcome, DisconnectReport, FastPollEnd, FastPollPhase};
