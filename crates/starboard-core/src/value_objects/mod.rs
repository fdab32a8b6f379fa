//! Value objects - immutable types that represent domain concepts

mod permalink;
mod snowflake;

pub use permalink::{Permalink, DEFAULT_LINK_BASE};
pub use snowflake::{Snowflake, SnowflakeParseError};
