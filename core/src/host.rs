//! The host-surface capability consumed by the render engine.
//!
//! The engine never touches a rendering target directly. It asks a
//! [`HostSurface`] to create nodes, decorate them, and finally swap them into a
//! surface in one step. Everything about what a "node" or "surface" really is
//! stays with the implementor.

use core::fmt::Debug;

use crate::element::{Style, Text};
use crate::value::Value;

/// Mutation primitives of a rendering target.
pub trait HostSurface {
    /// Handle to a node created by this host.
    type Node: Clone + Debug;
    /// Handle to a mounting point.
    type Surface: Clone + Debug;
    /// Failure raised by any primitive.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates a detached node for `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot create nodes of this kind.
    fn create_node(&mut self, tag: &str) -> Result<Self::Node, Self::Error>;

    /// Merges `style` onto the node's style declarations.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` is not a live node of this host.
    fn set_style_properties(&mut self, node: &Self::Node, style: &Style)
    -> Result<(), Self::Error>;

    /// Appends text to the node's content.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` is not a live node of this host.
    fn append_text_content(&mut self, node: &Self::Node, text: &Text) -> Result<(), Self::Error>;

    /// Receives a property the engine does not interpret.
    ///
    /// Hosts that have no notion of attributes can keep the default, which
    /// drops the property.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the property.
    fn set_property(
        &mut self,
        node: &Self::Node,
        key: &str,
        value: &Value,
    ) -> Result<(), Self::Error> {
        let _ = (node, key, value);
        Ok(())
    }

    /// Replaces whatever `surface` currently shows with `node`, in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is unknown or detached.
    fn replace_content(&mut self, surface: &Self::Surface, node: Self::Node)
    -> Result<(), Self::Error>;
}
