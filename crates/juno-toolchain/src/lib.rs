//! # Juno Toolchain
//!
//! Locates the pieces of an ESP-IDF installation on the host.
//!
//! This module provides the canonical path resolution for every tool Juno
//! hands to the build script:
//! - ESP-IDF root and its `idf.py` tools directory
//! - Python interpreter directory and executable
//! - Cross compiler, CMake, Ninja and the optional debug tools
//!
//! # Design
//!
//! - Lookups never fail: a tool is either found (`Some`) or absent (`None`)
//! - Search functions are pure and never log; narration lives in the resolver
//! - OS-specific naming comes from [`juno_core::Platform`]

pub mod kinds;
pub mod resolver;
pub mod search;
pub mod validate;

pub use kinds::ToolKind;
pub use resolver::{DetectionReport, PathResolver, ResolutionSource, ToolPath};
pub use search::SearchOrder;
