//! State module for tracking crawl target lifecycles
//!
//! - `TargetState`: where a single crawl target is between discovery and completion

mod target_state;

pub use target_state::TargetState;
