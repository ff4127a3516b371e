//! Exchange Logger API
//!
//! This module defines the public setup API a host process calls at startup.

pub mod capture_api;
