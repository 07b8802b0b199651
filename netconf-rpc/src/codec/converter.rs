use crate::node::{to_elements, ContainerNode, DataNode, LeafListNode, LeafNode, ListNode, MapEntryNode};
use crate::schema::{LeafType, SchemaNode, SchemaPath, SchemaRegistry};
use crate::xml::Element;
use crate::{QName, Status};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

/// Converts between XML payloads and [`ContainerNode`]s.
///
/// Conversion is addressed purely by absolute schema path: one converter
/// serves every operation registered against the same schema.
///
/// In strict mode, the default, an element with no schema definition fails
/// the conversion with `unknown-element`. Lenient converters skip such
/// elements.
#[derive(Clone, Debug)]
pub struct XmlNodeConverter {
    schema: Arc<dyn SchemaRegistry>,
    strict: bool,
}

impl XmlNodeConverter {
    /// A strict converter over `schema`.
    pub fn new(schema: Arc<dyn SchemaRegistry>) -> Self {
        XmlNodeConverter {
            schema,
            strict: true,
        }
    }

    /// Enable or disable rejection of unknown elements.
    #[must_use]
    pub fn strict(self, strict: bool) -> Self {
        XmlNodeConverter { strict, ..self }
    }

    /// Whether unknown elements are rejected.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The schema this converter validates against.
    pub fn schema(&self) -> &Arc<dyn SchemaRegistry> {
        &self.schema
    }

    /// Validate the children of `element` against the structure at `path` and
    /// build the matching node.
    ///
    /// The returned node is named after the schema node at `path`. Its
    /// children follow schema order regardless of document order.
    pub fn deserialize(&self, path: &SchemaPath, element: &Element) -> Result<ContainerNode, Status> {
        let target = self
            .schema
            .resolve(path)
            .ok_or_else(|| Status::operation_failed(format!("no schema node at {}", path)))?;

        let schema = target.children().ok_or_else(|| {
            Status::operation_failed(format!("schema node at {} has no data children", path))
        })?;

        let children = self.read_children(schema, element, path)?;
        Ok(ContainerNode::new(target.name().clone()).with_children(children))
    }

    /// Render the children of `node` as XML elements.
    pub fn serialize(&self, node: &ContainerNode) -> Vec<Element> {
        to_elements(node.children())
    }

    fn read_children(
        &self,
        schema: &[SchemaNode],
        element: &Element,
        path: &SchemaPath,
    ) -> Result<Vec<DataNode>, Status> {
        for child in element.children() {
            if schema.iter().any(|node| node.name() == child.name()) {
                continue;
            }
            if self.strict {
                return Err(Status::unknown_element(child.name().local_name())
                    .with_path(path.child(child.name().clone()).to_string()));
            }
            trace!("skipping unknown element {} under {}", child.name(), path);
        }

        let mut nodes = Vec::new();

        for node in schema {
            let path = path.child(node.name().clone());
            let matching: Vec<&Element> = element.children_named(node.name()).collect();

            match node {
                SchemaNode::Leaf(leaf) => match matching.as_slice() {
                    [] if leaf.is_mandatory() => {
                        return Err(Status::missing_element(leaf.name().local_name())
                            .with_path(path.to_string()));
                    }
                    [] => {}
                    [found] => {
                        let value = read_value(leaf.leaf_type(), found, &path)?;
                        nodes.push(DataNode::Leaf(LeafNode::new(leaf.name().clone(), value)));
                    }
                    _ => return Err(duplicate(&path)),
                },
                SchemaNode::LeafList(leaf_list) => {
                    if matching.is_empty() {
                        continue;
                    }
                    let values = matching
                        .iter()
                        .map(|found| read_value(leaf_list.leaf_type(), found, &path))
                        .collect::<Result<Vec<_>, _>>()?;
                    nodes.push(DataNode::LeafList(LeafListNode::new(
                        leaf_list.name().clone(),
                        values,
                    )));
                }
                SchemaNode::Container(container) => match matching.as_slice() {
                    [] => {}
                    [found] => {
                        let children = self.read_children(container.children(), found, &path)?;
                        nodes.push(DataNode::Container(
                            ContainerNode::new(container.name().clone()).with_children(children),
                        ));
                    }
                    _ => return Err(duplicate(&path)),
                },
                SchemaNode::List(list) => {
                    if matching.is_empty() {
                        continue;
                    }

                    let mut keys = HashSet::with_capacity(matching.len());
                    let mut entries = Vec::with_capacity(matching.len());

                    for found in matching {
                        let children = self.read_children(list.children(), found, &path)?;
                        let entry = MapEntryNode::new(list.name().clone(), children);

                        let key = list
                            .keys()
                            .iter()
                            .map(|key| {
                                entry.leaf(key).cloned().ok_or_else(|| {
                                    Status::missing_element(key.local_name())
                                        .with_path(path.child(key.clone()).to_string())
                                })
                            })
                            .collect::<Result<Vec<_>, _>>()?;

                        if !keys.insert(key) {
                            return Err(Status::bad_element(
                                list.name().local_name(),
                                format!("duplicate entry in list {}", list.name()),
                            )
                            .with_path(path.to_string()));
                        }

                        entries.push(entry);
                    }

                    nodes.push(DataNode::List(ListNode::new(list.name().clone(), entries)));
                }
            }
        }

        Ok(nodes)
    }
}

fn read_value(
    leaf_type: &LeafType,
    element: &Element,
    path: &SchemaPath,
) -> Result<crate::Value, Status> {
    if !element.children().is_empty() {
        return Err(Status::bad_element(
            element.name().local_name(),
            format!("{} must not contain elements", element.name()),
        )
        .with_path(path.to_string()));
    }

    let text = element.text().unwrap_or_default();
    leaf_type.parse(text).map_err(|reason| {
        Status::invalid_value(format!(
            "invalid value {:?} for {}: {}",
            text,
            element.name(),
            reason
        ))
        .with_bad_element(element.name().local_name())
        .with_path(path.to_string())
    })
}

fn duplicate(path: &SchemaPath) -> Status {
    let name = path.last().map(QName::local_name).unwrap_or_default();
    Status::bad_element(name, format!("{} occurs more than once", name))
        .with_path(path.to_string())
}
