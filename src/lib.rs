//! rompack - build-time ROM importer for handheld emulation firmware
//!
//! Discovers game images per system family, compresses them into the
//! containers the firmware's loaders understand, plans the external
//! flash layout, and emits the staged objects, descriptor tables and
//! linker directives the firmware build links against.

// Enforce strict code quality and reliability
#![deny(
    // Safety
    unsafe_code,

    // Correctness
    missing_debug_implementations,
    unreachable_pub,

    // Future compatibility
    future_incompatible,

    // Rust 2018 idioms
    rust_2018_idioms,

    // All warnings must be fixed
    warnings,
)]
#![warn(
    // Error handling best practices
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::unimplemented,
    clippy::todo,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_enum_variant,

    // Code clarity and maintainability
    clippy::cognitive_complexity,
    clippy::type_complexity,

    // Best practices
    clippy::clone_on_ref_ptr,
    clippy::wildcard_imports,
    clippy::enum_glob_use,
    clippy::if_not_else,
    clippy::single_match_else,
    clippy::needless_continue,
    clippy::explicit_iter_loop,
    clippy::explicit_into_iter_loop,
)]
#![allow(
    clippy::too_many_arguments,  // Some functions need refactoring
    missing_docs,  // TODO: Complete documentation
)]

pub mod api;
pub mod catalog;
pub mod emit;
pub mod exceptions;
pub mod exit_codes;
pub mod logger;
pub mod pack;
pub mod version;

// Re-export main API types
pub use api::{Collaborators, PackOptions, RunSummary, pack_firmware};
pub use exceptions::RomPackError;
pub use pack::codec::CompressionMethod;
