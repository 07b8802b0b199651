use crate::xml::Element;
use crate::{QName, Status};
use std::fmt;

/// A typed leaf value.
///
/// Values are produced by the codec after checking the lexical form against
/// the leaf's type, so their [`Display`](fmt::Display) form is always valid
/// wire content.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// `string` and string-based typedefs such as `date-and-time`.
    String(String),
    /// `boolean`
    Boolean(bool),
    /// `int8` to `int64`
    Int(i64),
    /// `uint8` to `uint64`
    Uint(u64),
    /// `decimal64`, in its lexical form.
    Decimal(String),
    /// `enumeration`
    Enumeration(String),
    /// `empty`
    Empty,
}

impl Value {
    /// The value as a string slice, for the string-like variants.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Decimal(s) | Value::Enumeration(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a signed integer.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(value) => Some(value),
            Value::Uint(value) => i64::try_from(value).ok(),
            _ => None,
        }
    }

    /// The value as an unsigned integer.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::Uint(value) => Some(value),
            Value::Int(value) => u64::try_from(value).ok(),
            _ => None,
        }
    }

    /// The value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Boolean(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::Decimal(s) | Value::Enumeration(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Empty => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(u)
    }
}

/// A node of the internal data tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataNode {
    /// A leaf and its value.
    Leaf(LeafNode),
    /// The values of a leaf-list.
    LeafList(LeafListNode),
    /// A container.
    Container(ContainerNode),
    /// The entries of a list.
    List(ListNode),
}

impl DataNode {
    /// The node name.
    pub fn name(&self) -> &QName {
        match self {
            DataNode::Leaf(leaf) => &leaf.name,
            DataNode::LeafList(leaf_list) => &leaf_list.name,
            DataNode::Container(container) => &container.name,
            DataNode::List(list) => &list.name,
        }
    }

    fn write_elements(&self, out: &mut Vec<Element>) {
        match self {
            DataNode::Leaf(leaf) => out.push(leaf_element(&leaf.name, &leaf.value)),
            DataNode::LeafList(leaf_list) => out.extend(
                leaf_list
                    .values
                    .iter()
                    .map(|value| leaf_element(&leaf_list.name, value)),
            ),
            DataNode::Container(container) => out.push(container.to_element()),
            DataNode::List(list) => out.extend(list.entries.iter().map(|entry| {
                Element::new(entry.name.clone()).with_children(to_elements(&entry.children))
            })),
        }
    }
}

fn leaf_element(name: &QName, value: &Value) -> Element {
    let element = Element::new(name.clone());
    match value {
        Value::Empty => element,
        value => element.with_text(value.to_string()),
    }
}

pub(crate) fn to_elements(children: &[DataNode]) -> Vec<Element> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        child.write_elements(&mut out);
    }
    out
}

/// A leaf value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafNode {
    name: QName,
    value: Value,
}

impl LeafNode {
    /// Create a leaf.
    pub fn new(name: QName, value: impl Into<Value>) -> Self {
        LeafNode {
            name,
            value: value.into(),
        }
    }

    /// The leaf name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The leaf value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the leaf, returning its value.
    pub fn into_value(self) -> Value {
        self.value
    }
}

/// The values of a leaf-list, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafListNode {
    name: QName,
    values: Vec<Value>,
}

impl LeafListNode {
    /// Create a leaf-list.
    pub fn new(name: QName, values: impl IntoIterator<Item = Value>) -> Self {
        LeafListNode {
            name,
            values: values.into_iter().collect(),
        }
    }

    /// The leaf-list name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The values in order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// A container, or the input or output of an operation.
///
/// Children produced by the codec are in schema order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerNode {
    name: QName,
    children: Vec<DataNode>,
}

impl ContainerNode {
    /// An empty container.
    pub fn new(name: QName) -> Self {
        ContainerNode {
            name,
            children: Vec::new(),
        }
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: DataNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = DataNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append a leaf.
    #[must_use]
    pub fn with_leaf(self, name: QName, value: impl Into<Value>) -> Self {
        self.with_child(DataNode::Leaf(LeafNode::new(name, value)))
    }

    /// The container name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Rename the container.
    #[must_use]
    pub fn renamed(self, name: QName) -> Self {
        ContainerNode { name, ..self }
    }

    /// The children.
    pub fn children(&self) -> &[DataNode] {
        &self.children
    }

    /// Consume the container, returning its children.
    pub fn into_children(self) -> Vec<DataNode> {
        self.children
    }

    /// Returns `true` if the container has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The child named `name`.
    pub fn child(&self, name: &QName) -> Option<&DataNode> {
        self.children.iter().find(|child| child.name() == name)
    }

    /// The value of leaf `name`.
    pub fn leaf(&self, name: &QName) -> Option<&Value> {
        match self.child(name)? {
            DataNode::Leaf(leaf) => Some(&leaf.value),
            _ => None,
        }
    }

    /// The value of leaf `name`, failing with `missing-element` if absent.
    pub fn required_leaf(&self, name: &QName) -> Result<&Value, Status> {
        self.leaf(name)
            .ok_or_else(|| Status::missing_element(name.local_name()))
    }

    /// Render this container and its subtree as XML.
    pub fn to_element(&self) -> Element {
        Element::new(self.name.clone()).with_children(to_elements(&self.children))
    }
}

/// The entries of a list, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListNode {
    name: QName,
    entries: Vec<MapEntryNode>,
}

impl ListNode {
    /// Create a list node.
    pub fn new(name: QName, entries: impl IntoIterator<Item = MapEntryNode>) -> Self {
        ListNode {
            name,
            entries: entries.into_iter().collect(),
        }
    }

    /// The list name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The entries in order.
    pub fn entries(&self) -> &[MapEntryNode] {
        &self.entries
    }
}

/// One entry of a keyed list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapEntryNode {
    name: QName,
    children: Vec<DataNode>,
}

impl MapEntryNode {
    /// Create a list entry. Key leaves are ordinary children.
    pub fn new(name: QName, children: impl IntoIterator<Item = DataNode>) -> Self {
        MapEntryNode {
            name,
            children: children.into_iter().collect(),
        }
    }

    /// The list name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The children, key leaves included.
    pub fn children(&self) -> &[DataNode] {
        &self.children
    }

    /// The value of leaf `name`.
    pub fn leaf(&self, name: &QName) -> Option<&Value> {
        self.children.iter().find_map(|child| match child {
            DataNode::Leaf(leaf) if &leaf.name == name => Some(&leaf.value),
            _ => None,
        })
    }
}
