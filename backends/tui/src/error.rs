use std::io;

use rivulet_core::RenderError;
use thiserror::Error;

use crate::host::TermNodeId;

/// Errors that can occur while building or running a [`TuiApp`](crate::TuiApp).
#[derive(Debug, Error)]
pub enum TuiError {
    /// Low level terminal I/O failure.
    #[error("terminal I/O error")]
    Io(#[from] io::Error),
    /// The node handle was never created by this host or was already replaced.
    #[error("terminal node {0:?} does not exist")]
    UnknownNode(TermNodeId),
    /// A style declaration could not be mapped onto terminal styling.
    #[error("cannot use `{value}` for `{property}` in a terminal")]
    InvalidStyle {
        /// The style property.
        property: String,
        /// The rejected value.
        value: String,
    },
    /// Rendering pipeline error.
    #[error(transparent)]
    Render(#[from] RenderError),
}
