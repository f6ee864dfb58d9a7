//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the DreamVault offline agent:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate holds the pieces every agent instance needs before it handles its
//! first event: validated settings with injected host bridges, a subscriber
//! setup for `tracing`, and a broadcast channel for observing what the agent does.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
