//! Reelvault - self-hosted video catalog and streaming server
//!
//! This library crate exposes the server pieces for integration testing.

pub mod config;
pub mod library;
pub mod server;
pub mod streaming;
