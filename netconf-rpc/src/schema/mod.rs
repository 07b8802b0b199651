//! Schema model consumed by the codec and the identity resolver.
//!
//! Schemas are compiled elsewhere; this crate only needs to look nodes up by
//! absolute [`SchemaPath`]. [`SchemaRegistry`] is that lookup, and
//! [`SchemaContext`] is an in-memory registry assembled from [`Module`]s.

mod context;
mod leaf;

pub use self::context::{Module, SchemaContext};
pub use self::leaf::LeafType;

use crate::{OperationKind, QName};
use std::fmt;

/// An absolute path of schema node names from a module's top level.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct SchemaPath {
    steps: Vec<QName>,
}

impl SchemaPath {
    /// Create a path from its steps.
    pub fn new(steps: impl IntoIterator<Item = QName>) -> Self {
        SchemaPath {
            steps: steps.into_iter().collect(),
        }
    }

    /// The empty path.
    pub fn root() -> Self {
        SchemaPath::default()
    }

    /// This path extended by `name`.
    pub fn child(&self, name: QName) -> SchemaPath {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend(self.steps.iter().cloned());
        steps.push(name);
        SchemaPath { steps }
    }

    /// This path without its last step. The parent of the root is the root.
    pub fn parent(&self) -> SchemaPath {
        let len = self.steps.len().saturating_sub(1);
        SchemaPath {
            steps: self.steps[..len].to_vec(),
        }
    }

    /// The last step.
    pub fn last(&self) -> Option<&QName> {
        self.steps.last()
    }

    /// All steps.
    pub fn steps(&self) -> &[QName] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` for the root path.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("/");
        }
        for step in &self.steps {
            write!(f, "/{}", step)?;
        }
        Ok(())
    }
}

impl fmt::Debug for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaPath({})", self)
    }
}

/// A schema data node.
#[derive(Clone, Debug)]
pub enum SchemaNode {
    /// `leaf`
    Leaf(LeafSchema),
    /// `leaf-list`
    LeafList(LeafListSchema),
    /// `container`
    Container(ContainerSchema),
    /// `list`
    List(ListSchema),
}

impl SchemaNode {
    /// The node name.
    pub fn name(&self) -> &QName {
        match self {
            SchemaNode::Leaf(leaf) => &leaf.name,
            SchemaNode::LeafList(leaf_list) => &leaf_list.name,
            SchemaNode::Container(container) => &container.name,
            SchemaNode::List(list) => &list.name,
        }
    }
}

impl From<LeafSchema> for SchemaNode {
    fn from(leaf: LeafSchema) -> Self {
        SchemaNode::Leaf(leaf)
    }
}

impl From<LeafListSchema> for SchemaNode {
    fn from(leaf_list: LeafListSchema) -> Self {
        SchemaNode::LeafList(leaf_list)
    }
}

impl From<ContainerSchema> for SchemaNode {
    fn from(container: ContainerSchema) -> Self {
        SchemaNode::Container(container)
    }
}

impl From<ListSchema> for SchemaNode {
    fn from(list: ListSchema) -> Self {
        SchemaNode::List(list)
    }
}

/// A `leaf` definition.
#[derive(Clone, Debug)]
pub struct LeafSchema {
    name: QName,
    leaf_type: LeafType,
    mandatory: bool,
}

impl LeafSchema {
    /// An optional leaf of the given type.
    pub fn new(name: QName, leaf_type: LeafType) -> Self {
        LeafSchema {
            name,
            leaf_type,
            mandatory: false,
        }
    }

    /// Mark the leaf `mandatory true`.
    #[must_use]
    pub fn mandatory(self) -> Self {
        LeafSchema {
            mandatory: true,
            ..self
        }
    }

    /// The leaf name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The leaf type.
    pub fn leaf_type(&self) -> &LeafType {
        &self.leaf_type
    }

    /// Whether the leaf must be present.
    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }
}

/// A `leaf-list` definition.
#[derive(Clone, Debug)]
pub struct LeafListSchema {
    name: QName,
    leaf_type: LeafType,
}

impl LeafListSchema {
    /// A leaf-list of the given type.
    pub fn new(name: QName, leaf_type: LeafType) -> Self {
        LeafListSchema { name, leaf_type }
    }

    /// The leaf-list name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The type of each value.
    pub fn leaf_type(&self) -> &LeafType {
        &self.leaf_type
    }
}

/// A `container` definition, also used for operation input and output.
#[derive(Clone, Debug)]
pub struct ContainerSchema {
    name: QName,
    children: Vec<SchemaNode>,
    actions: Vec<OperationSchema>,
}

impl ContainerSchema {
    /// An empty container.
    pub fn new(name: QName) -> Self {
        ContainerSchema {
            name,
            children: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Add a child node.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<SchemaNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Add an action defined on this container.
    #[must_use]
    pub fn with_action(mut self, action: OperationSchema) -> Self {
        self.actions.push(action);
        self
    }

    /// The container name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Child nodes in schema order.
    pub fn children(&self) -> &[SchemaNode] {
        &self.children
    }

    /// Actions defined on this container.
    pub fn actions(&self) -> &[OperationSchema] {
        &self.actions
    }
}

/// A `list` definition.
#[derive(Clone, Debug)]
pub struct ListSchema {
    name: QName,
    keys: Vec<QName>,
    children: Vec<SchemaNode>,
    actions: Vec<OperationSchema>,
}

impl ListSchema {
    /// A list keyed by the leaves named in `keys`, in key order.
    ///
    /// The key leaves themselves are added with [`ListSchema::with_child`]
    /// like any other leaf.
    pub fn new(name: QName, keys: impl IntoIterator<Item = QName>) -> Self {
        ListSchema {
            name,
            keys: keys.into_iter().collect(),
            children: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Add a child node.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<SchemaNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Add an action defined on entries of this list.
    #[must_use]
    pub fn with_action(mut self, action: OperationSchema) -> Self {
        self.actions.push(action);
        self
    }

    /// The list name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Key leaf names in key order.
    pub fn keys(&self) -> &[QName] {
        &self.keys
    }

    /// Child nodes in schema order.
    pub fn children(&self) -> &[SchemaNode] {
        &self.children
    }

    /// Actions defined on entries of this list.
    pub fn actions(&self) -> &[OperationSchema] {
        &self.actions
    }

    /// The definition of key leaf `key`.
    pub fn key_leaf(&self, key: &QName) -> Option<&LeafSchema> {
        self.children.iter().find_map(|child| match child {
            SchemaNode::Leaf(leaf) if &leaf.name == key => Some(leaf),
            _ => None,
        })
    }
}

/// An `rpc` or `action` definition.
#[derive(Clone, Debug)]
pub struct OperationSchema {
    name: QName,
    kind: OperationKind,
    input: ContainerSchema,
    output: ContainerSchema,
}

impl OperationSchema {
    /// An RPC with empty input and output.
    pub fn rpc(name: QName) -> Self {
        OperationSchema::new(name, OperationKind::Rpc)
    }

    /// An action with empty input and output.
    pub fn action(name: QName) -> Self {
        OperationSchema::new(name, OperationKind::Action)
    }

    fn new(name: QName, kind: OperationKind) -> Self {
        OperationSchema {
            input: ContainerSchema::new(name.with_local_name("input")),
            output: ContainerSchema::new(name.with_local_name("output")),
            name,
            kind,
        }
    }

    /// Add an input node.
    #[must_use]
    pub fn with_input(mut self, child: impl Into<SchemaNode>) -> Self {
        self.input.children.push(child.into());
        self
    }

    /// Add an output node.
    #[must_use]
    pub fn with_output(mut self, child: impl Into<SchemaNode>) -> Self {
        self.output.children.push(child.into());
        self
    }

    /// The operation name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// RPC or action.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// The input structure.
    pub fn input(&self) -> &ContainerSchema {
        &self.input
    }

    /// The output structure.
    pub fn output(&self) -> &ContainerSchema {
        &self.output
    }
}

/// A borrowed view of whatever a [`SchemaPath`] resolves to.
#[derive(Clone, Copy, Debug)]
pub enum SchemaRef<'a> {
    /// A container, or the input or output of an operation.
    Container(&'a ContainerSchema),
    /// A list.
    List(&'a ListSchema),
    /// A leaf.
    Leaf(&'a LeafSchema),
    /// A leaf-list.
    LeafList(&'a LeafListSchema),
    /// An RPC or action.
    Operation(&'a OperationSchema),
}

impl<'a> SchemaRef<'a> {
    /// The name of the referenced node.
    pub fn name(&self) -> &'a QName {
        match *self {
            SchemaRef::Container(container) => &container.name,
            SchemaRef::List(list) => &list.name,
            SchemaRef::Leaf(leaf) => &leaf.name,
            SchemaRef::LeafList(leaf_list) => &leaf_list.name,
            SchemaRef::Operation(operation) => &operation.name,
        }
    }

    /// Child data nodes, `None` for nodes that cannot have children.
    pub fn children(&self) -> Option<&'a [SchemaNode]> {
        match *self {
            SchemaRef::Container(container) => Some(&container.children),
            SchemaRef::List(list) => Some(&list.children),
            _ => None,
        }
    }

    /// Resolve one path step below this node.
    pub fn step(&self, name: &QName) -> Option<SchemaRef<'a>> {
        match *self {
            SchemaRef::Container(ContainerSchema {
                children, actions, ..
            })
            | SchemaRef::List(ListSchema {
                children, actions, ..
            }) => children
                .iter()
                .find(|child| child.name() == name)
                .map(SchemaRef::from)
                .or_else(|| {
                    actions
                        .iter()
                        .find(|action| &action.name == name)
                        .map(SchemaRef::Operation)
                }),
            SchemaRef::Operation(operation) => {
                if &operation.input.name == name {
                    Some(SchemaRef::Container(&operation.input))
                } else if &operation.output.name == name {
                    Some(SchemaRef::Container(&operation.output))
                } else {
                    None
                }
            }
            SchemaRef::Leaf(_) | SchemaRef::LeafList(_) => None,
        }
    }
}

impl<'a> From<&'a SchemaNode> for SchemaRef<'a> {
    fn from(node: &'a SchemaNode) -> Self {
        match node {
            SchemaNode::Leaf(leaf) => SchemaRef::Leaf(leaf),
            SchemaNode::LeafList(leaf_list) => SchemaRef::LeafList(leaf_list),
            SchemaNode::Container(container) => SchemaRef::Container(container),
            SchemaNode::List(list) => SchemaRef::List(list),
        }
    }
}

/// Lookup of schema nodes by absolute path.
///
/// The registry is shared by every dispatcher of a device and must be safe to
/// query concurrently.
pub trait SchemaRegistry: Send + Sync + fmt::Debug + 'static {
    /// Resolve `path` to a schema node.
    fn resolve(&self, path: &SchemaPath) -> Option<SchemaRef<'_>>;

    /// Resolve `path` to a list definition.
    fn list(&self, path: &SchemaPath) -> Option<&ListSchema> {
        match self.resolve(path)? {
            SchemaRef::List(list) => Some(list),
            _ => None,
        }
    }

    /// Resolve `path` to an operation definition.
    fn operation(&self, path: &SchemaPath) -> Option<&OperationSchema> {
        match self.resolve(path)? {
            SchemaRef::Operation(operation) => Some(operation),
            _ => None,
        }
    }
}
