//! Errors raised by the render engine.

use alloc::boxed::Box;
use alloc::string::String;

use thiserror::Error;

/// Failure of a render pass or of a state update that drove one.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Nothing has been rendered yet, or the engine was unmounted.
    #[error("no component is mounted")]
    NotMounted,
    /// A setter outlived the mount it belonged to.
    #[error("the state setter belongs to a mount that no longer exists")]
    Unmounted,
    /// `render` was called while a pass was in flight.
    #[error("a render pass is already in flight")]
    Reentrant,
    /// A component function raised during invocation.
    #[error("component `{component}` failed")]
    Component {
        /// Name of the failing component.
        component: String,
        /// What the component raised.
        #[source]
        source: anyhow::Error,
    },
    /// Component descriptors kept resolving to further components.
    #[error("component nesting exceeded {limit} levels")]
    ComponentDepth {
        /// The configured depth limit.
        limit: usize,
    },
    /// A component descriptor appeared among children, which only carry text.
    #[error("component `{component}` cannot be mounted as a child")]
    NestedComponent {
        /// Name of the offending component.
        component: String,
    },
    /// An effect callback failed under the fail-fast policy.
    #[error("effect callback failed")]
    Effect(#[source] anyhow::Error),
    /// State updates kept scheduling passes.
    #[error("state updates scheduled more than {limit} consecutive passes")]
    RenderLoop {
        /// The configured pass limit.
        limit: usize,
    },
    /// A host-surface primitive failed.
    #[error("host surface error")]
    Host(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RenderError {
    pub(crate) fn host(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Host(Box::new(error))
    }
}
