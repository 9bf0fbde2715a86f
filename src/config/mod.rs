//! Dialect profiles on disk
//!
//! A profile is a YAML document deserialized into a
//! [`SyntaxConfig`](vsub_core::SyntaxConfig). Skip rules and supplements
//! are code, so a profile loaded from disk carries neither; use the
//! built-in [`dialects`](crate::dialects) when they matter.

pub mod loader;

pub use loader::{parse_profile, LoadedProfile, ProfileLoader, PROFILE_DIR_ENV};
