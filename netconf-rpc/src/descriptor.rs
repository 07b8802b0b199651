use crate::schema::SchemaPath;
use crate::QName;
use std::fmt;

/// Whether an operation is a global RPC or an action bound to a data node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// A YANG `rpc`, invoked as a direct child of `<rpc>`.
    Rpc,
    /// A YANG `action`, invoked inside `<action>` on an addressed data node.
    Action,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Rpc => f.write_str("rpc"),
            OperationKind::Action => f.write_str("action"),
        }
    }
}

/// Identifies one registered operation.
///
/// A descriptor carries the qualified name of the operation and the absolute
/// schema path of its definition. The input and output structures live at
/// that path plus `input` and `output`.
///
/// ```rust
/// # use netconf_rpc::{OperationDescriptor, QName};
/// # use netconf_rpc::schema::SchemaPath;
/// let server = QName::new("urn:example:data-center", "server");
/// let reset = QName::new("urn:example:data-center", "reset");
///
/// let descriptor = OperationDescriptor::action(SchemaPath::new([server]), reset);
///
/// assert_eq!(descriptor.path().len(), 2);
/// assert_eq!(descriptor.input_path().last().unwrap().local_name(), "input");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperationDescriptor {
    name: QName,
    path: SchemaPath,
    kind: OperationKind,
}

impl OperationDescriptor {
    /// Describe a global RPC.
    pub fn rpc(name: QName) -> Self {
        OperationDescriptor {
            path: SchemaPath::new([name.clone()]),
            name,
            kind: OperationKind::Rpc,
        }
    }

    /// Describe an action defined on the data node at `parent`.
    pub fn action(parent: SchemaPath, name: QName) -> Self {
        OperationDescriptor {
            path: parent.child(name.clone()),
            name,
            kind: OperationKind::Action,
        }
    }

    /// The qualified name of the operation.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The absolute schema path of the operation.
    pub fn path(&self) -> &SchemaPath {
        &self.path
    }

    /// RPC or action.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// The schema path of the data node an action is defined on.
    pub fn parent_path(&self) -> SchemaPath {
        self.path.parent()
    }

    /// The absolute schema path of the operation input.
    pub fn input_path(&self) -> SchemaPath {
        self.path.child(self.name.with_local_name("input"))
    }

    /// The absolute schema path of the operation output.
    pub fn output_path(&self) -> SchemaPath {
        self.path.child(self.name.with_local_name("output"))
    }
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.path)
    }
}
