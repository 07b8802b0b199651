//! The `data-center` model: a list of servers, each offering `reset` and
//! `start` actions.

use netconf_rpc::codec::{FromNode, IntoNode, XmlCodec};
use netconf_rpc::schema::{LeafSchema, LeafType, ListSchema, Module, OperationSchema, SchemaPath};
use netconf_rpc::server::{ActionDispatcher, ActionService};
use netconf_rpc::{
    async_trait, BoxFuture, ContainerNode, DeviceBuilder, InstanceIdentifier, QName, Request,
    Response, Status,
};
use std::sync::Arc;
use tracing::debug;

/// Namespace of the `data-center` module.
pub const NAMESPACE: &str = "urn:example:data-center";

/// Revision of the `data-center` module.
pub const REVISION: &str = "2018-08-07";

fn q(local: &str) -> QName {
    QName::new(NAMESPACE, local)
}

/// The `data-center` module: list `server` keyed by `name`.
pub fn module() -> Module {
    let reset = OperationSchema::action(q("reset"))
        .with_input(LeafSchema::new(q("reset-at"), LeafType::DateAndTime).mandatory())
        .with_output(LeafSchema::new(q("reset-finished-at"), LeafType::DateAndTime).mandatory());

    let start = OperationSchema::action(q("start"))
        .with_input(LeafSchema::new(q("start-at"), LeafType::DateAndTime).mandatory())
        .with_output(LeafSchema::new(q("start-finished-at"), LeafType::DateAndTime).mandatory());

    let server = ListSchema::new(q("server"), [q("name")])
        .with_child(LeafSchema::new(q("name"), LeafType::String))
        .with_action(reset)
        .with_action(start);

    Module::new("data-center", NAMESPACE)
        .with_revision(REVISION)
        .with_data(server)
}

/// Input of `reset`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResetInput {
    /// When to reset, as an RFC 3339 date-and-time.
    pub reset_at: String,
}

/// Output of `reset`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResetOutput {
    /// When the reset finished.
    pub reset_finished_at: String,
}

/// Input of `start`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartInput {
    /// When to start, as an RFC 3339 date-and-time.
    pub start_at: String,
}

/// Output of `start`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartOutput {
    /// When the start finished.
    pub start_finished_at: String,
}

fn text_leaf(node: &ContainerNode, name: &str) -> Result<String, Status> {
    let name = q(name);
    let value = node.required_leaf(&name)?;
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| Status::bad_element(name.local_name(), "expected a date-and-time"))
}

impl FromNode for ResetInput {
    fn from_node(node: ContainerNode) -> Result<Self, Status> {
        Ok(ResetInput {
            reset_at: text_leaf(&node, "reset-at")?,
        })
    }
}

impl IntoNode for ResetOutput {
    fn into_node(self, name: QName) -> ContainerNode {
        ContainerNode::new(name).with_leaf(q("reset-finished-at"), self.reset_finished_at)
    }
}

impl FromNode for StartInput {
    fn from_node(node: ContainerNode) -> Result<Self, Status> {
        Ok(StartInput {
            start_at: text_leaf(&node, "start-at")?,
        })
    }
}

impl IntoNode for StartOutput {
    fn into_node(self, name: QName) -> ContainerNode {
        ContainerNode::new(name).with_leaf(q("start-finished-at"), self.start_finished_at)
    }
}

/// The name of the server an action was invoked on.
pub fn server_name(target: &InstanceIdentifier) -> Result<&str, Status> {
    target
        .target_key()
        .and_then(|key| key.get(&q("name")))
        .and_then(|name| name.as_str())
        .ok_or_else(|| Status::operation_failed(format!("{} does not address a server", target)))
}

/// Business logic of the `server` actions.
#[async_trait]
pub trait DataCenter: Send + Sync + 'static {
    /// Reset the server `target` addresses.
    async fn reset(
        &self,
        target: InstanceIdentifier,
        request: Request<ResetInput>,
    ) -> Result<Response<ResetOutput>, Status>;

    /// Start the server `target` addresses.
    async fn start(
        &self,
        target: InstanceIdentifier,
        request: Request<StartInput>,
    ) -> Result<Response<StartOutput>, Status>;
}

/// Registers a [`DataCenter`] implementation with a device.
#[derive(Debug)]
pub struct DataCenterServer<T> {
    inner: Arc<T>,
}

impl<T: DataCenter> DataCenterServer<T> {
    /// Serve `inner`.
    pub fn new(inner: T) -> Self {
        Self::from_arc(Arc::new(inner))
    }

    /// Serve an already shared `inner`.
    pub fn from_arc(inner: Arc<T>) -> Self {
        DataCenterServer { inner }
    }

    /// Add the `reset` and `start` actions to `builder`.
    pub fn register(self, builder: DeviceBuilder) -> DeviceBuilder {
        let schema = builder.schema().clone();
        let server = SchemaPath::new([q("server")]);

        let reset = ActionDispatcher::new(
            server.clone(),
            q("reset"),
            ResetSvc(self.inner.clone()),
            XmlCodec::<ResetOutput, ResetInput>::new(schema.clone()),
            schema.clone(),
        );
        let start = ActionDispatcher::new(
            server,
            q("start"),
            StartSvc(self.inner),
            XmlCodec::<StartOutput, StartInput>::new(schema.clone()),
            schema,
        );

        builder.add(reset).add(start)
    }
}

struct ResetSvc<T>(Arc<T>);

impl<T> Clone for ResetSvc<T> {
    fn clone(&self) -> Self {
        ResetSvc(self.0.clone())
    }
}

impl<T: DataCenter> ActionService<ResetInput> for ResetSvc<T> {
    type Response = ResetOutput;
    type Future = BoxFuture<'static, Result<Response<ResetOutput>, Status>>;

    fn call(&mut self, target: InstanceIdentifier, request: Request<ResetInput>) -> Self::Future {
        let inner = self.0.clone();
        Box::pin(async move { inner.reset(target, request).await })
    }
}

struct StartSvc<T>(Arc<T>);

impl<T> Clone for StartSvc<T> {
    fn clone(&self) -> Self {
        StartSvc(self.0.clone())
    }
}

impl<T: DataCenter> ActionService<StartInput> for StartSvc<T> {
    type Response = StartOutput;
    type Future = BoxFuture<'static, Result<Response<StartOutput>, Status>>;

    fn call(&mut self, target: InstanceIdentifier, request: Request<StartInput>) -> Self::Future {
        let inner = self.0.clone();
        Box::pin(async move { inner.start(target, request).await })
    }
}

/// A data center whose servers reset and start instantly.
///
/// Every reset reports finishing at `2020-09-03T16:20:00Z` and every start
/// at `2020-09-03T16:30:00Z`.
#[derive(Clone, Debug, Default)]
pub struct SimulatedDataCenter {
    _priv: (),
}

impl SimulatedDataCenter {
    /// Reported completion time of every reset.
    pub const RESET_FINISHED_AT: &'static str = "2020-09-03T16:20:00Z";

    /// Reported completion time of every start.
    pub const START_FINISHED_AT: &'static str = "2020-09-03T16:30:00Z";

    /// Create the simulator.
    pub fn new() -> Self {
        SimulatedDataCenter::default()
    }
}

#[async_trait]
impl DataCenter for SimulatedDataCenter {
    async fn reset(
        &self,
        target: InstanceIdentifier,
        request: Request<ResetInput>,
    ) -> Result<Response<ResetOutput>, Status> {
        let server = server_name(&target)?;
        debug!("resetting {} at {}", server, request.get_ref().reset_at);

        Ok(Response::new(ResetOutput {
            reset_finished_at: Self::RESET_FINISHED_AT.to_owned(),
        }))
    }

    async fn start(
        &self,
        target: InstanceIdentifier,
        request: Request<StartInput>,
    ) -> Result<Response<StartOutput>, Status> {
        let server = server_name(&target)?;
        debug!("starting {} at {}", server, request.get_ref().start_at);

        Ok(Response::new(StartOutput {
            start_finished_at: Self::START_FINISHED_AT.to_owned(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netconf_rpc::{ListKey, Value};

    #[test]
    fn typed_input_requires_its_leaf() {
        let node = ContainerNode::new(q("input")).with_leaf(q("reset-at"), "2020-09-03T16:00:00Z");
        assert_eq!(
            ResetInput::from_node(node).unwrap().reset_at,
            "2020-09-03T16:00:00Z"
        );

        let err = StartInput::from_node(ContainerNode::new(q("input"))).unwrap_err();
        assert_eq!(err.info().bad_element.as_deref(), Some("start-at"));
    }

    #[test]
    fn server_name_comes_from_the_key() {
        let target = InstanceIdentifier::builder()
            .entry(q("server"), ListKey::new([(q("name"), Value::from("server-1"))]))
            .build();
        assert_eq!(server_name(&target).unwrap(), "server-1");

        assert!(server_name(&InstanceIdentifier::default()).is_err());
    }
}
