//! Compiles a Rust library for an Android build variant with `cargo ndk`.
//!
//! A host build calls [`pipeline::compile`] once per variant and
//! [`pipeline::clean`] from its clean task. Both shell out to `cargo`,
//! `rustup` and `cargo-ndk` through the [`exec::Exec`] trait.

pub mod cargo;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod manifest;
pub mod meta;
pub mod pipeline;
pub mod shell;
pub mod toolchain;

pub use error::{Error, Result};
