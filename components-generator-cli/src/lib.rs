//! components-generator CLI library

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod commands;

pub use commands::{BuildCommand, RefreshCommand, StatusCommand, TypesCommand};
