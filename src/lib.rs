//! # Exchange Logger

//! Full request/response capture for intercepting HTTP proxies.
//! For allow-listed destination hosts every exchange is written to its own
//! log file; everything else passes through without any capture work.
//!
//! ## Features
//!
//! - Allow-list gate with host normalization
//! - One human-readable log artifact per exchange
//! - Incremental HTTP/1.x response assembly from arbitrarily sliced chunks
//! - Pretty-printed JSON bodies
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Host proxy engine                        │
//! ├─────────────────────────────────────────────────────────┤
//! │            ProxyHooks (pre-connect / chunk / close)      │
//! ├─────────────────────────────────────────────────────────┤
//! │                   CaptureSession                         │
//! │  ┌──────────┐  ┌──────────┐  ┌───────────┐  ┌────────┐  │
//! │  │  Allow   │  │ Request  │  │ Response  │  │  Log   │  │
//! │  │  List    │──│ Recorder │──│ Assembler │──│ Target │  │
//! │  └──────────┘  └──────────┘  └───────────┘  └────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod capture;
pub mod error;
pub mod models;
pub mod parser;
pub mod proxy;

pub use error::CaptureError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
