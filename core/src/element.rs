//! Immutable element descriptors.
//!
//! An [`Element`] is the declarative output of a component: what to build, with
//! which properties, and in which order its children paint. Descriptors are
//! created fresh on every pass and never mutated once built; cloning one only
//! bumps a reference count.
//!
//! ```
//! use rivulet_core::{Props, children, create_element};
//!
//! let element = create_element(
//!     "div",
//!     Props::new().style("color", "red"),
//!     children!["hello"],
//! );
//! assert_eq!(element.tag(), Some("div"));
//! ```

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::hooks::Hooks;
use crate::value::Value;

/// Ordered style declarations, merged onto the host node's style surface.
pub type Style = BTreeMap<String, String>;

type ComponentFn = dyn Fn(&Hooks, &Props) -> anyhow::Result<Element>;

/// A named component function.
///
/// Components receive the hook handle of the pass they run in and the
/// properties of the descriptor that referenced them.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: Rc<ComponentFn>,
}

impl Component {
    /// Wraps a component function under a display name.
    pub fn new<F>(name: impl Into<Rc<str>>, render: F) -> Self
    where
        F: Fn(&Hooks, &Props) -> anyhow::Result<Element> + 'static,
    {
        Self {
            name: name.into(),
            render: Rc::new(render),
        }
    }

    /// The name used in logs, errors and serialized descriptors.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the component once.
    ///
    /// # Errors
    ///
    /// Returns whatever error the component function raises.
    pub fn call(&self, hooks: &Hooks, props: &Props) -> anyhow::Result<Element> {
        (self.render)(hooks, props)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

/// What a descriptor builds: a host tag or a component.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// A host-surface tag name such as `div`.
    Tag(String),
    /// A component function to invoke.
    Component(Component),
}

impl From<&str> for Kind {
    fn from(value: &str) -> Self {
        Self::Tag(value.to_string())
    }
}

impl From<String> for Kind {
    fn from(value: String) -> Self {
        Self::Tag(value)
    }
}

impl From<Component> for Kind {
    fn from(value: Component) -> Self {
        Self::Component(value)
    }
}

/// Text appended to a host node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Text {
    /// A string.
    Str(String),
    /// An integer, painted in decimal.
    Int(i64),
    /// A float, painted with `Display`.
    Float(f64),
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

/// One entry of a descriptor's `children`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Child {
    /// A nested descriptor.
    Element(Element),
    /// Text or a number.
    Text(Text),
}

impl From<Element> for Child {
    fn from(value: Element) -> Self {
        Self::Element(value)
    }
}

impl From<Text> for Child {
    fn from(value: Text) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Self::Text(Text::Str(value.to_string()))
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Self::Text(Text::Str(value))
    }
}

impl From<&String> for Child {
    fn from(value: &String) -> Self {
        Self::Text(Text::Str(value.clone()))
    }
}

macro_rules! impl_child_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Self::Text(Text::Int(i64::from(value)))
                }
            }
        )*
    };
}

impl_child_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_child_from_wide_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    i64::try_from(value)
                        .map_or_else(|_| Self::Text(Text::Str(value.to_string())), |int| {
                            Self::Text(Text::Int(int))
                        })
                }
            }
        )*
    };
}

impl_child_from_wide_int!(u64, usize, isize);

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Self::Text(Text::Float(value))
    }
}

impl From<Value> for Child {
    fn from(value: Value) -> Self {
        match value {
            Value::Int(i) => Self::Text(Text::Int(i)),
            Value::Float(v) => Self::Text(Text::Float(v)),
            Value::Str(s) => Self::Text(Text::Str(s)),
            other => Self::Text(Text::Str(other.to_string())),
        }
    }
}

/// The property bag of a descriptor.
///
/// `style` and `children` are the keys the engine interprets itself; anything
/// else lands in the `extra` map and is handed to the host untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Props {
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<Style>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Child>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl Props {
    /// Creates an empty property bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one style declaration.
    #[must_use]
    pub fn style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.style
            .get_or_insert_with(Style::new)
            .insert(key.into(), value.into());
        self
    }

    /// Merges a set of style declarations.
    #[must_use]
    pub fn styles<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let style = self.style.get_or_insert_with(Style::new);
        for (key, value) in entries {
            style.insert(key.into(), value.into());
        }
        self
    }

    /// Replaces `children`. A single value becomes a one-element sequence.
    #[must_use]
    pub fn children(mut self, children: impl IntoChildren) -> Self {
        self.children = children.into_children();
        self
    }

    /// Sets an arbitrary property.
    ///
    /// The reserved keys are routed to their typed fields: a `style` map is
    /// merged into the style declarations and `children` is coerced into a
    /// sequence, wrapping a lone value. A `style` that is not a map is
    /// dropped.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match (key.as_str(), value) {
            ("style", Value::Map(entries)) => {
                let style = self.style.get_or_insert_with(Style::new);
                for (name, declaration) in entries {
                    style.insert(name, declaration.to_string());
                }
            }
            ("children", Value::List(items)) => {
                self.children = items.into_iter().map(Child::from).collect();
            }
            ("children", item) => self.children = alloc::vec![Child::from(item)],
            ("style", other) => {
                tracing::warn!(value = %other, "`style` must be a map of declarations; ignoring it");
            }
            (_, value) => {
                self.extra.insert(key, value);
            }
        }
        self
    }

    /// The style declarations, if any were set.
    #[must_use]
    pub const fn style_map(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    /// The ordered children.
    #[must_use]
    pub fn child_list(&self) -> &[Child] {
        &self.children
    }

    /// Looks up an unreserved property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Iterates over the unreserved properties in key order.
    pub fn extra(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.extra.iter().map(|(key, value)| (key.as_str(), value))
    }
}

/// Conversion into a children sequence.
///
/// Implemented for sequences and for every single child value, so a lone
/// string or number is coerced into a one-element list.
pub trait IntoChildren {
    /// Performs the conversion.
    fn into_children(self) -> Vec<Child>;
}

impl IntoChildren for Vec<Child> {
    fn into_children(self) -> Vec<Child> {
        self
    }
}

impl IntoChildren for Child {
    fn into_children(self) -> Vec<Child> {
        alloc::vec![self]
    }
}

macro_rules! impl_into_children {
    ($($ty:ty),*) => {
        $(
            impl IntoChildren for $ty {
                fn into_children(self) -> Vec<Child> {
                    alloc::vec![Child::from(self)]
                }
            }
        )*
    };
}

impl_into_children!(Element, Text, &str, String, i32, i64, u32, u64, usize, f64);

#[derive(Debug)]
struct ElementInner {
    kind: Kind,
    props: Props,
}

/// An immutable node description.
#[derive(Debug, Clone)]
pub struct Element(Rc<ElementInner>);

impl Element {
    /// The kind of node this descriptor builds.
    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.0.kind
    }

    /// The tag name, when the kind is a host tag.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match &self.0.kind {
            Kind::Tag(tag) => Some(tag),
            Kind::Component(_) => None,
        }
    }

    /// The property bag.
    #[must_use]
    pub fn props(&self) -> &Props {
        &self.0.props
    }

    /// Shorthand for `props().child_list()`.
    #[must_use]
    pub fn children(&self) -> &[Child] {
        self.0.props.child_list()
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Element", 2)?;
        state.serialize_field("kind", &self.0.kind)?;
        state.serialize_field("props", &self.0.props)?;
        state.end()
    }
}

/// Builds a descriptor.
///
/// Non-empty `children` replace whatever `props` already carried under
/// `children`; an empty list leaves them as they are.
pub fn create_element(kind: impl Into<Kind>, mut props: Props, children: Vec<Child>) -> Element {
    if !children.is_empty() {
        props.children = children;
    }
    Element(Rc::new(ElementInner {
        kind: kind.into(),
        props,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variadic_children_replace_prop_children() {
        let element = create_element("p", Props::new().children("old"), children!["new", 2]);
        assert_eq!(element.children().len(), 2);
        assert!(matches!(&element.children()[0], Child::Text(Text::Str(s)) if s == "new"));
        assert!(matches!(element.children()[1], Child::Text(Text::Int(2))));
    }

    #[test]
    fn single_child_is_coerced_into_a_sequence() {
        let element = create_element("p", Props::new().children(7), children![]);
        assert_eq!(element.children().len(), 1);
    }

    #[test]
    fn reserved_keys_in_the_bag_are_routed() {
        let mut style = BTreeMap::new();
        style.insert("color".to_string(), Value::from("red"));
        let props = Props::new()
            .with("style", Value::Map(style))
            .with("children", "lonely")
            .with("data-id", 9);
        assert_eq!(props.style_map().and_then(|s| s.get("color")).map(String::as_str), Some("red"));
        assert_eq!(props.child_list().len(), 1);
        assert_eq!(props.get("data-id"), Some(&Value::Int(9)));
        assert!(props.get("style").is_none());
    }

    #[test]
    fn non_map_style_is_dropped() {
        let props = Props::new().with("style", "color: red");
        assert!(props.style_map().is_none());
        assert!(props.get("style").is_none());
    }

    #[test]
    fn wide_integers_paint_exactly() {
        let items = vec!["a", "b", "c"];
        let element = create_element("p", Props::new(), children![items.len(), u64::MAX]);
        assert!(matches!(element.children()[0], Child::Text(Text::Int(3))));
        assert!(matches!(
            &element.children()[1],
            Child::Text(Text::Str(s)) if s == "18446744073709551615"
        ));
    }

    #[test]
    fn clones_share_the_same_payload() {
        let element = create_element("div", Props::new().with("id", "root"), children![]);
        let copy = element.clone();
        assert!(Rc::ptr_eq(&element.0, &copy.0));
        assert_eq!(copy.props().get("id"), Some(&Value::from("root")));
    }

    #[test]
    fn serializes_kind_props_and_children() {
        let inner = create_element("span", Props::new(), children!["x"]);
        let element = create_element(
            "div",
            Props::new().style("color", "red").with("id", "main"),
            children!["hello", 1, inner],
        );
        let json = serde_json::to_value(&element).expect("descriptor serializes");
        assert_eq!(
            json,
            serde_json::json!({
                "kind": { "tag": "div" },
                "props": {
                    "style": { "color": "red" },
                    "children": [
                        "hello",
                        1,
                        { "kind": { "tag": "span" }, "props": { "children": ["x"] } }
                    ],
                    "id": "main"
                }
            })
        );
    }

    #[test]
    fn components_serialize_by_name() {
        let counter = Component::new("Counter", |_, _| {
            Ok(create_element("div", Props::new(), children![]))
        });
        let element = create_element(counter, Props::new(), children![]);
        let json = serde_json::to_value(&element).expect("descriptor serializes");
        assert_eq!(json["kind"], serde_json::json!({ "component": "Counter" }));
    }
}
