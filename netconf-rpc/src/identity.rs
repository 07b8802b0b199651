//! Operation identity resolution.
//!
//! Given an `<rpc>` element and the descriptor of the operation it was routed
//! to, [`rpc_input`] and [`resolve_action`] find the element carrying the
//! operation input. For actions the [`InstanceIdentifier`] of the data node
//! the action runs on is built along the way.
//!
//! Key leaves are looked up only inside the list entry element on the
//! action's path, never elsewhere in the document. A key leaf that is missing
//! fails with `missing-element`, one that occurs more than once with
//! `bad-element`, both with error type `protocol`. Either way the handler is
//! never called.

use crate::schema::{ListSchema, SchemaPath, SchemaRef, SchemaRegistry};
use crate::xml::Element;
use crate::{ns, ErrorType, OperationDescriptor, QName, Status, Value};
use std::fmt;

/// The key values identifying one entry of a keyed list, in key order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListKey {
    values: Vec<(QName, Value)>,
}

impl ListKey {
    /// A key from `(key leaf, value)` pairs in key order.
    pub fn new(values: impl IntoIterator<Item = (QName, Value)>) -> Self {
        ListKey {
            values: values.into_iter().collect(),
        }
    }

    /// The value of key leaf `name`.
    pub fn get(&self, name: &QName) -> Option<&Value> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// All `(key leaf, value)` pairs in key order.
    pub fn values(&self) -> &[(QName, Value)] {
        &self.values
    }
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.values {
            write!(f, "[{}='{}']", name.local_name(), value)?;
        }
        Ok(())
    }
}

/// One step of an [`InstanceIdentifier`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathArgument {
    /// A container.
    Node(QName),
    /// One entry of a keyed list.
    Entry {
        /// The list name.
        name: QName,
        /// The key of the addressed entry.
        key: ListKey,
    },
}

impl PathArgument {
    /// The node name of this step.
    pub fn name(&self) -> &QName {
        match self {
            PathArgument::Node(name) | PathArgument::Entry { name, .. } => name,
        }
    }
}

/// The resolved location of a data node, list keys included.
///
/// Actions receive the identifier of the node they were invoked on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct InstanceIdentifier {
    path: Vec<PathArgument>,
}

impl InstanceIdentifier {
    /// Start building an identifier from the top level.
    pub fn builder() -> InstanceIdentifierBuilder {
        InstanceIdentifierBuilder::default()
    }

    /// The steps of this identifier.
    pub fn path(&self) -> &[PathArgument] {
        &self.path
    }

    /// The key of the innermost list entry on the path, if any.
    pub fn target_key(&self) -> Option<&ListKey> {
        self.path.iter().rev().find_map(|arg| match arg {
            PathArgument::Entry { key, .. } => Some(key),
            PathArgument::Node(_) => None,
        })
    }

    /// The schema path of the addressed node.
    pub fn schema_path(&self) -> SchemaPath {
        SchemaPath::new(self.path.iter().map(|arg| arg.name().clone()))
    }
}

impl fmt::Display for InstanceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for arg in &self.path {
            match arg {
                PathArgument::Node(name) => write!(f, "/{}", name)?,
                PathArgument::Entry { name, key } => write!(f, "/{}{}", name, key)?,
            }
        }
        Ok(())
    }
}

/// Builder for [`InstanceIdentifier`].
#[derive(Debug, Default)]
pub struct InstanceIdentifierBuilder {
    path: Vec<PathArgument>,
}

impl InstanceIdentifierBuilder {
    /// Step into container `name`.
    #[must_use]
    pub fn node(mut self, name: QName) -> Self {
        self.path.push(PathArgument::Node(name));
        self
    }

    /// Step into the entry of list `name` identified by `key`.
    #[must_use]
    pub fn entry(mut self, name: QName, key: ListKey) -> Self {
        self.path.push(PathArgument::Entry { name, key });
        self
    }

    /// Finish the identifier.
    pub fn build(self) -> InstanceIdentifier {
        InstanceIdentifier { path: self.path }
    }
}

/// Locate the input element of the RPC described by `descriptor`: the unique
/// child of `<rpc>` named after the operation.
pub fn rpc_input<'a>(rpc: &'a Element, descriptor: &OperationDescriptor) -> Result<&'a Element, Status> {
    unique_child(rpc, descriptor.name())
}

/// Locate the input element of the action described by `descriptor` and the
/// data node it runs on.
///
/// The data tree inside `<action>` is walked along the action's schema path.
/// Every list on the way contributes the key read from its own entry element.
pub fn resolve_action<'a>(
    rpc: &'a Element,
    descriptor: &OperationDescriptor,
    schema: &dyn SchemaRegistry,
) -> Result<(&'a Element, InstanceIdentifier), Status> {
    let mut current = unique_child(rpc, &QName::new(ns::YANG_1, "action"))?;
    let mut path = SchemaPath::root();
    let mut target = InstanceIdentifier::builder();

    for step in descriptor.parent_path().steps() {
        current = unique_child(current, step)?;
        path = path.child(step.clone());

        target = match schema.resolve(&path) {
            Some(SchemaRef::List(list)) => {
                let key = read_key(current, list, &path)?;
                target.entry(step.clone(), key)
            }
            Some(SchemaRef::Container(_)) => target.node(step.clone()),
            _ => {
                return Err(Status::operation_failed(format!(
                    "{} does not address a container or list",
                    path
                )))
            }
        };
    }

    let input = unique_child(current, descriptor.name())?;
    Ok((input, target.build()))
}

fn read_key(entry: &Element, list: &ListSchema, path: &SchemaPath) -> Result<ListKey, Status> {
    let mut key = Vec::with_capacity(list.keys().len());

    for name in list.keys() {
        let leaf = list
            .key_leaf(name)
            .ok_or_else(|| Status::operation_failed(format!("list {} has no key leaf {}", path, name)))?;

        let element = unique_child(entry, name)
            .map_err(|status| status.with_path(path.child(name.clone()).to_string()))?;

        let text = element.text().unwrap_or_default();
        let value = leaf.leaf_type().parse(text).map_err(|reason| {
            Status::invalid_value(format!("invalid key {} {:?}: {}", name, text, reason))
                .with_error_type(ErrorType::Protocol)
                .with_bad_element(name.local_name())
        })?;

        key.push((name.clone(), value));
    }

    Ok(ListKey::new(key))
}

fn unique_child<'a>(parent: &'a Element, name: &QName) -> Result<&'a Element, Status> {
    let mut found = parent.children_named(name);

    match (found.next(), found.next()) {
        (Some(child), None) => Ok(child),
        (None, _) => {
            Err(Status::missing_element(name.local_name()).with_error_type(ErrorType::Protocol))
        }
        (Some(_), Some(_)) => Err(Status::bad_element(
            name.local_name(),
            format!("{} occurs more than once under {}", name, parent.name()),
        )
        .with_error_type(ErrorType::Protocol)),
    }
}
