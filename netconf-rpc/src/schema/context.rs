use super::{SchemaNode, SchemaPath, SchemaRef, SchemaRegistry};
use crate::schema::OperationSchema;
use crate::QName;

/// The definitions of one YANG module.
#[derive(Clone, Debug)]
pub struct Module {
    name: String,
    namespace: String,
    revision: Option<String>,
    data: Vec<SchemaNode>,
    rpcs: Vec<OperationSchema>,
}

impl Module {
    /// An empty module.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            namespace: namespace.into(),
            revision: None,
            data: Vec::new(),
            rpcs: Vec::new(),
        }
    }

    /// Set the module revision.
    #[must_use]
    pub fn with_revision(self, revision: impl Into<String>) -> Self {
        Module {
            revision: Some(revision.into()),
            ..self
        }
    }

    /// Add a top-level data node.
    #[must_use]
    pub fn with_data(mut self, node: impl Into<SchemaNode>) -> Self {
        self.data.push(node.into());
        self
    }

    /// Add an RPC.
    #[must_use]
    pub fn with_rpc(mut self, rpc: OperationSchema) -> Self {
        self.rpcs.push(rpc);
        self
    }

    /// The module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The module namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The module revision, if any.
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    fn top_level(&self, name: &QName) -> Option<SchemaRef<'_>> {
        self.data
            .iter()
            .find(|node| node.name() == name)
            .map(SchemaRef::from)
            .or_else(|| {
                self.rpcs
                    .iter()
                    .find(|rpc| rpc.name() == name)
                    .map(SchemaRef::Operation)
            })
    }
}

/// An in-memory [`SchemaRegistry`] over a set of modules.
///
/// ```rust
/// # use netconf_rpc::schema::*;
/// # use netconf_rpc::QName;
/// let ns = "urn:example:data-center";
/// let name = QName::new(ns, "name");
/// let server = ListSchema::new(QName::new(ns, "server"), [name.clone()])
///     .with_child(LeafSchema::new(name, LeafType::String));
///
/// let schema = SchemaContext::new().with_module(Module::new("data-center", ns).with_data(server));
///
/// let path = SchemaPath::new([QName::new(ns, "server")]);
/// assert!(schema.list(&path).is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SchemaContext {
    modules: Vec<Module>,
}

impl SchemaContext {
    /// An empty context.
    pub fn new() -> Self {
        SchemaContext::default()
    }

    /// Add a module.
    #[must_use]
    pub fn with_module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    /// All modules.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }
}

impl SchemaRegistry for SchemaContext {
    fn resolve(&self, path: &SchemaPath) -> Option<SchemaRef<'_>> {
        let (first, rest) = path.steps().split_first()?;

        let mut current = self
            .modules
            .iter()
            .filter(|module| module.namespace == first.namespace())
            .find_map(|module| module.top_level(first))?;

        for step in rest {
            current = current.step(step)?;
        }

        Some(current)
    }
}
