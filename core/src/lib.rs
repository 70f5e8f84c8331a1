//! Core of the Rivulet UI runtime.
//!
//! Components are plain functions that return [`Element`] descriptors and
//! remember state between calls through [`Hooks`]. An [`Engine`] mounts a root
//! component on a [`HostSurface`], re-runs it whenever a [`Setter`] changes a
//! value, and runs effects after each commit.
//!
//! The host is an opaque capability: [`MemoryHost`] keeps everything in an
//! arena, other hosts live in their own crates.

#![allow(clippy::module_name_repetitions)]

extern crate alloc;

#[macro_use]
mod macros;

pub mod config;
pub mod element;
mod engine;
mod error;
pub mod hooks;
pub mod host;
pub mod memory;
mod store;
pub mod value;

#[cfg(test)]
mod tests;

pub use config::{ConfigError, EffectErrorPolicy, EngineConfig};
pub use element::{
    Child, Component, Element, IntoChildren, Kind, Props, Style, Text, create_element,
};
pub use engine::{Engine, EngineBuilder, RenderStats};
pub use error::RenderError;
pub use hooks::{Hooks, Setter};
pub use host::HostSurface;
pub use memory::{MemoryHost, MemoryHostError, MemoryNode, NodeId, SurfaceId};
pub use value::Value;

#[doc(hidden)]
pub mod __private {
    pub use alloc::vec;
    pub use alloc::vec::Vec;
}
