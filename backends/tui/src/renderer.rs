use crossterm::style::{Attribute, Color as TermColor, ContentStyle, StyledContent};
use rivulet_core::Style;

use crate::error::TuiError;
use crate::host::TermNode;

/// Represents a fully resolved frame ready to be drawn to the terminal.
#[derive(Debug, Default, Clone)]
pub struct RenderFrame {
    lines: Vec<RenderLine>,
}

impl RenderFrame {
    /// Pushes a new, empty line and returns it for filling.
    pub fn push_line(&mut self) -> &mut RenderLine {
        self.lines.push(RenderLine::default());
        let index = self.lines.len() - 1;
        &mut self.lines[index]
    }

    /// Returns the set of lines recorded in this frame.
    #[must_use]
    pub fn lines(&self) -> &[RenderLine] {
        &self.lines
    }

    /// Concatenates the frame's text, one line per row, without styling.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                line.segments()
                    .iter()
                    .map(RenderSegment::content)
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Representation of a single line in the terminal output.
#[derive(Debug, Default, Clone)]
pub struct RenderLine {
    segments: Vec<RenderSegment>,
}

impl RenderLine {
    /// Pushes a new segment onto the line.
    pub fn push(&mut self, segment: RenderSegment) {
        self.segments.push(segment);
    }

    /// Returns the list of segments contained in this line.
    #[must_use]
    pub fn segments(&self) -> &[RenderSegment] {
        &self.segments
    }
}

/// Atomic piece of content rendered on a line.
#[derive(Debug, Clone)]
pub struct RenderSegment {
    content: String,
    style: ContentStyle,
}

impl RenderSegment {
    /// Creates a plain (unstyled) segment.
    pub fn plain(content: impl Into<String>) -> Self {
        Self::styled(content, ContentStyle::new())
    }

    /// Creates a segment with custom styling.
    pub fn styled(content: impl Into<String>, style: ContentStyle) -> Self {
        Self {
            content: content.into(),
            style,
        }
    }

    /// Borrows the raw text stored in this segment.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The styling applied to the text.
    #[must_use]
    pub const fn style(&self) -> &ContentStyle {
        &self.style
    }

    /// Converts this segment into a [`StyledContent`] for printing through crossterm.
    #[must_use]
    pub fn as_styled_content(&self) -> StyledContent<String> {
        self.style.apply(self.content.clone())
    }
}

/// Turns committed nodes into terminal frames.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Renderer;

impl Renderer {
    /// Creates a new renderer instance.
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self
    }

    /// Paints a node: every line of its text content becomes one styled line.
    ///
    /// # Errors
    ///
    /// Returns an error if a style declaration has no terminal equivalent.
    pub(crate) fn paint(self, node: &TermNode) -> Result<RenderFrame, TuiError> {
        let style = content_style(node.tag(), node.style())?;
        let mut frame = RenderFrame::default();
        for text in node.text().split('\n') {
            let line = frame.push_line();
            if !text.is_empty() {
                line.push(RenderSegment::styled(text, style));
            }
        }
        Ok(frame)
    }
}

fn content_style(tag: &str, style: &Style) -> Result<ContentStyle, TuiError> {
    let mut content_style = ContentStyle::new();
    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "b" | "strong" => {
            content_style.attributes.set(Attribute::Bold);
        }
        "em" | "i" => content_style.attributes.set(Attribute::Italic),
        "u" => content_style.attributes.set(Attribute::Underlined),
        _ => {}
    }

    for (property, value) in style {
        let value = value.trim();
        match property.as_str() {
            "color" => content_style.foreground_color = Some(parse_color(property, value)?),
            "background" | "background-color" => {
                content_style.background_color = Some(parse_color(property, value)?);
            }
            "font-weight" if matches!(value, "bold" | "bolder" | "600" | "700" | "800" | "900") => {
                content_style.attributes.set(Attribute::Bold);
            }
            "font-style" if value == "italic" => content_style.attributes.set(Attribute::Italic),
            "text-decoration" if value == "underline" => {
                content_style.attributes.set(Attribute::Underlined);
            }
            "text-decoration" if value == "line-through" => {
                content_style.attributes.set(Attribute::CrossedOut);
            }
            other => tracing::trace!(property = other, "style has no terminal equivalent"),
        }
    }
    Ok(content_style)
}

/// Accepts crossterm color names (`red`, `dark_grey`, ...) and `#rrggbb`.
fn parse_color(property: &str, value: &str) -> Result<TermColor, TuiError> {
    let invalid = || TuiError::InvalidStyle {
        property: property.to_string(),
        value: value.to_string(),
    };
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: core::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        return Ok(TermColor::Rgb {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        });
    }
    TermColor::try_from(value).map_err(|()| invalid())
}
