//! # starboard-engine
//!
//! Application layer: decides whether a reaction event is in scope, counts
//! qualifying reactions, composes mirror posts, and drives each source
//! message through its mirror lifecycle against a [`ChatPlatform`].
//!
//! [`ChatPlatform`]: starboard_core::ChatPlatform

pub mod composer;
pub mod counter;
pub mod error;
pub mod filter;
pub mod keyed_lock;
pub mod lifecycle;
pub mod locator;

pub use composer::{count_fragment, header_count, patch_header, PostComposer, COUNT_MARKER};
pub use counter::ReactionCounter;
pub use error::{CompositionError, EngineError, EngineResult};
pub use filter::{EligibilityFilter, Rejection};
pub use keyed_lock::{KeyedGuard, KeyedLock};
pub use lifecycle::{LifecycleAction, LifecycleManager};
pub use locator::{MirrorIndex, MirrorLocator};
