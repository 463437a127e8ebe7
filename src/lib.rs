//! GenFE — a desktop studio for AI image generation and light raster editing.
//!
//! The binary in `src/main.rs` is a thin launcher; everything lives in this
//! library crate so the headless CLI and the test suite share the same code.

#![allow(clippy::too_many_arguments)]

pub mod i18n;
pub mod logger;

pub mod api;
pub mod app;
pub mod cli;
pub mod components;
pub mod editor;
pub mod io;
pub mod settings;
