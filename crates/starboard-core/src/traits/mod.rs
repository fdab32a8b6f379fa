//! Port traits implemented by infrastructure crates

mod platform;

pub use platform::{ChatPlatform, PlatformResult, SharedPlatform};
