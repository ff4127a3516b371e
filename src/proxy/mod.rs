//! Proxy engine integration
//!
//! The hook trait the host proxy calls into, and a relay helper for hosts
//! built on tokio streams.

pub mod hooks;
pub mod relay;

pub use hooks::ProxyHooks;
pub use relay::relay_upstream;
