//! Error types for the domain layer

mod platform_error;

pub use platform_error::PlatformError;
