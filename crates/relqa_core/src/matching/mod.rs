//! Cross-release matching.
//!
//! ```text
//! Matcher::run(old, new)
//!     ├── chapters     (A → B, timestamp equality)
//!     ├── fingerprint  (A → B, optional)
//!     ├── duration     (A → B, then B → A; menu clusters)
//!     ├── slicing      (A → B, then B → A; all-or-nothing)
//!     └── residue      (unmatched bucket)
//! ```

mod matcher;
mod pool;
mod strategy;

pub use matcher::{MatchEvent, MatchEventKind, MatchOutcome, MatchPass, Matcher, MatcherConfig};
pub use pool::{ItemPool, Side};
pub use strategy::{durations_match, menu_cluster, slice_intervals, timestamps_equal};
