//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-agent`, `core-runtime`). Host applications can depend
//! on `dreamvault-workspace` and enable `desktop-shims` to get an agent wired to
//! the native bridges without naming each crate.

#[cfg(feature = "desktop-shims")]
pub use core_agent::{OfflineCacheAgent, WorkerEvent};
#[cfg(feature = "desktop-shims")]
pub use core_runtime::config::AgentConfig;
