#![allow(clippy::multiple_crate_versions)]

//! Terminal host surface for Rivulet.
//!
//! [`TerminalHost`] implements [`rivulet_core::HostSurface`] by painting each
//! committed node as a frame of styled lines. [`TuiApp`] pairs it with an
//! engine.

pub use crate::app::{TuiApp, TuiAppBuilder};
pub use crate::host::{Screen, TermNodeId, TerminalHost};
pub use crate::renderer::{RenderFrame, RenderLine, RenderSegment};
pub use crate::terminal::Terminal;

mod app;
mod error;
mod host;
mod renderer;
mod terminal;

pub use error::TuiError;
