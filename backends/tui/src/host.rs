use std::collections::HashMap;

use rivulet_core::{HostSurface, Style, Text};

use crate::error::TuiError;
use crate::renderer::{RenderFrame, Renderer};
use crate::terminal::Terminal;

/// Handle to a node owned by a [`TerminalHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TermNodeId(u64);

/// The one surface a terminal offers: the whole screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Screen;

#[derive(Debug, Clone, Default)]
pub(crate) struct TermNode {
    tag: String,
    style: Style,
    text: String,
}

impl TermNode {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn tag(&self) -> &str {
        &self.tag
    }

    pub(crate) const fn style(&self) -> &Style {
        &self.style
    }

    pub(crate) const fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }
}

/// Host surface that paints committed nodes onto a [`Terminal`].
#[derive(Debug)]
pub struct TerminalHost {
    terminal: Terminal,
    renderer: Renderer,
    nodes: HashMap<TermNodeId, TermNode>,
    next_id: u64,
    painted: Option<TermNodeId>,
    last_frame: Option<RenderFrame>,
}

impl TerminalHost {
    /// Wraps a terminal.
    #[must_use]
    pub fn new(terminal: Terminal) -> Self {
        Self {
            terminal,
            renderer: Renderer::new(),
            nodes: HashMap::new(),
            next_id: 0,
            painted: None,
            last_frame: None,
        }
    }

    /// Provides immutable access to the terminal handle.
    #[must_use]
    pub const fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    /// The most recently painted frame.
    #[must_use]
    pub const fn last_frame(&self) -> Option<&RenderFrame> {
        self.last_frame.as_ref()
    }

    /// The node currently on screen.
    #[must_use]
    pub const fn painted(&self) -> Option<TermNodeId> {
        self.painted
    }

    /// Returns `true` while `id` refers to a live node.
    #[must_use]
    pub fn contains(&self, id: TermNodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn node_mut(&mut self, id: TermNodeId) -> Result<&mut TermNode, TuiError> {
        self.nodes.get_mut(&id).ok_or(TuiError::UnknownNode(id))
    }
}

impl HostSurface for TerminalHost {
    type Node = TermNodeId;
    type Surface = Screen;
    type Error = TuiError;

    fn create_node(&mut self, tag: &str) -> Result<TermNodeId, TuiError> {
        let id = TermNodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, TermNode::new(tag));
        Ok(id)
    }

    fn set_style_properties(&mut self, node: &TermNodeId, style: &Style) -> Result<(), TuiError> {
        let node = self.node_mut(*node)?;
        for (key, value) in style {
            node.style.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn append_text_content(&mut self, node: &TermNodeId, text: &Text) -> Result<(), TuiError> {
        self.node_mut(*node)?.push_text(&text.to_string());
        Ok(())
    }

    fn replace_content(&mut self, _surface: &Screen, node: TermNodeId) -> Result<(), TuiError> {
        let frame = {
            let content = self.nodes.get(&node).ok_or(TuiError::UnknownNode(node))?;
            self.renderer.paint(content)?
        };
        self.terminal.render(&frame)?;
        tracing::trace!(lines = frame.lines().len(), "painted frame");

        // Nodes built by aborted passes are never painted; drop them with the old content.
        self.nodes.retain(|id, _| *id == node);
        self.painted = Some(node);
        self.last_frame = Some(frame);
        Ok(())
    }
}
