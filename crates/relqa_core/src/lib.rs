//! relqa core - cross-release media matching and audio correlation
//!
//! Pairs files from an old and a new release of the same content, writes
//! the pairing as a reviewable plan, then compares every confirmed group.
//! It has no UI dependencies and is driven by the `relqa` CLI.
//!
//! ```text
//! probe ──► matching ──► persistence (plan.csv) ──► compare
//!   │                                                  │
//!   └────────────── audio (decode, fingerprint) ◄──────┘
//! ```

pub mod audio;
pub mod compare;
pub mod config;
pub mod logging;
pub mod matching;
pub mod models;
pub mod persistence;
pub mod probe;
pub mod tools;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
