//! Wayclip - clipboard image path/bytes switcher for Wayland
//!
//! This library exports the core modules for testing and potential reuse.

pub mod clipboard;
pub mod command;
pub mod daemon;
pub mod error;
pub mod focus;
pub mod logging;
pub mod models;
pub mod storage;
pub mod sync;
