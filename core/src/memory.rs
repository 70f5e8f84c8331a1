//! An in-memory host surface.
//!
//! [`MemoryHost`] keeps nodes in an arena and surfaces in a list, which makes it
//! the host of choice for tests and headless rendering. Replacing a surface's
//! content deletes the previous node outright, so a stale handle can be checked
//! with [`MemoryHost::contains`].

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;

use crate::element::{Style, Text};
use crate::host::HostSurface;
use crate::value::Value;

/// Handle to a node owned by a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a surface owned by a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(usize);

/// Errors produced by [`MemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryHostError {
    /// The node handle does not refer to a live node.
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    /// The surface handle was not created by this host.
    #[error("surface {0:?} does not exist")]
    UnknownSurface(SurfaceId),
    /// The surface was detached and can no longer be painted.
    #[error("surface `{0}` is detached")]
    Detached(String),
    /// The tag was configured to be rejected.
    #[error("host refused to create `<{0}>`")]
    Rejected(String),
}

/// A node as stored by [`MemoryHost`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryNode {
    tag: String,
    style: Style,
    text: String,
    properties: BTreeMap<String, Value>,
}

impl MemoryNode {
    /// The tag the node was created with.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The merged style declarations.
    #[must_use]
    pub const fn style(&self) -> &Style {
        &self.style
    }

    /// Reads one style declaration.
    #[must_use]
    pub fn style_property(&self, key: &str) -> Option<&str> {
        self.style.get(key).map(String::as_str)
    }

    /// The concatenated text content.
    #[must_use]
    pub fn text_content(&self) -> &str {
        &self.text
    }

    /// Reads a pass-through property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

#[derive(Debug)]
struct SurfaceState {
    name: String,
    content: Option<NodeId>,
    commits: usize,
    attached: bool,
}

/// Arena-backed host surface.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: BTreeMap<NodeId, MemoryNode>,
    next_node: u64,
    surfaces: Vec<SurfaceState>,
    rejected: BTreeSet<String>,
}

impl MemoryHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a named, attached surface.
    pub fn create_surface(&mut self, name: impl Into<String>) -> SurfaceId {
        self.surfaces.push(SurfaceState {
            name: name.into(),
            content: None,
            commits: 0,
            attached: true,
        });
        SurfaceId(self.surfaces.len() - 1)
    }

    /// Detaches a surface. Later commits to it fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is unknown.
    pub fn detach(&mut self, surface: SurfaceId) -> Result<(), MemoryHostError> {
        self.surface_mut(surface)?.attached = false;
        Ok(())
    }

    /// Makes [`HostSurface::create_node`] fail for `tag`.
    pub fn reject_tag(&mut self, tag: impl Into<String>) {
        self.rejected.insert(tag.into());
    }

    /// Lifts a rejection set by [`Self::reject_tag`].
    pub fn accept_tag(&mut self, tag: &str) {
        self.rejected.remove(tag);
    }

    /// The handle of the node currently shown by `surface`.
    #[must_use]
    pub fn content_id(&self, surface: SurfaceId) -> Option<NodeId> {
        self.surfaces.get(surface.0).and_then(|s| s.content)
    }

    /// The node currently shown by `surface`.
    #[must_use]
    pub fn content(&self, surface: SurfaceId) -> Option<&MemoryNode> {
        self.content_id(surface).and_then(|id| self.nodes.get(&id))
    }

    /// How many times `surface` had its content replaced.
    #[must_use]
    pub fn commit_count(&self, surface: SurfaceId) -> usize {
        self.surfaces.get(surface.0).map_or(0, |s| s.commits)
    }

    /// Looks up a live node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(&id)
    }

    /// Returns `true` while `id` refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of live nodes, committed or not.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut MemoryNode, MemoryHostError> {
        self.nodes
            .get_mut(&id)
            .ok_or(MemoryHostError::UnknownNode(id))
    }

    fn surface_mut(&mut self, id: SurfaceId) -> Result<&mut SurfaceState, MemoryHostError> {
        self.surfaces
            .get_mut(id.0)
            .ok_or(MemoryHostError::UnknownSurface(id))
    }
}

impl HostSurface for MemoryHost {
    type Node = NodeId;
    type Surface = SurfaceId;
    type Error = MemoryHostError;

    fn create_node(&mut self, tag: &str) -> Result<NodeId, MemoryHostError> {
        if self.rejected.contains(tag) {
            return Err(MemoryHostError::Rejected(tag.to_string()));
        }
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            id,
            MemoryNode {
                tag: tag.to_string(),
                ..MemoryNode::default()
            },
        );
        Ok(id)
    }

    fn set_style_properties(&mut self, node: &NodeId, style: &Style) -> Result<(), MemoryHostError> {
        let node = self.node_mut(*node)?;
        for (key, value) in style {
            node.style.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn append_text_content(&mut self, node: &NodeId, text: &Text) -> Result<(), MemoryHostError> {
        let node = self.node_mut(*node)?;
        node.text.push_str(&text.to_string());
        Ok(())
    }

    fn set_property(&mut self, node: &NodeId, key: &str, value: &Value) -> Result<(), MemoryHostError> {
        self.node_mut(*node)?
            .properties
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn replace_content(&mut self, surface: &SurfaceId, node: NodeId) -> Result<(), MemoryHostError> {
        if !self.nodes.contains_key(&node) {
            return Err(MemoryHostError::UnknownNode(node));
        }
        let state = self.surface_mut(*surface)?;
        if !state.attached {
            return Err(MemoryHostError::Detached(state.name.clone()));
        }
        let previous = state.content.replace(node);
        state.commits += 1;
        if let Some(previous) = previous.filter(|previous| *previous != node) {
            self.nodes.remove(&previous);
        }
        Ok(())
    }
}
