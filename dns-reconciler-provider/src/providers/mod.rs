//! DNS Provider implementations

/// Shared utilities used by provider implementations.
pub mod common;

#[cfg(feature = "lightsail")]
pub mod lightsail;

#[cfg(feature = "lightsail")]
pub use lightsail::{LightsailProvider, LightsailProviderBuilder};
