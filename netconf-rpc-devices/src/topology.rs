//! The network topology RPCs: `remove-node-from-topology`.

use netconf_rpc::codec::{FromNode, IntoNode, XmlCodec};
use netconf_rpc::schema::{LeafListSchema, LeafSchema, LeafType, Module, OperationSchema};
use netconf_rpc::server::{RpcDispatcher, RpcService};
use netconf_rpc::{
    async_trait, BoxFuture, ContainerNode, DataNode, DeviceBuilder, QName, Request, Response,
    Status, Value,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Namespace of the topology RPC module.
pub const NAMESPACE: &str = "urn:tech.pantheon.netconfdevice.network.topology.rpcs";

/// Revision of the topology RPC module.
pub const REVISION: &str = "2023-09-27";

fn q(local: &str) -> QName {
    QName::new(NAMESPACE, local)
}

/// The topology RPC module.
pub fn module() -> Module {
    let remove = OperationSchema::rpc(q("remove-node-from-topology"))
        .with_input(LeafSchema::new(q("topology-id"), LeafType::String).mandatory())
        .with_input(LeafListSchema::new(q("node-ids"), LeafType::String))
        .with_output(LeafSchema::new(q("topology-id"), LeafType::String));

    Module::new("network-topology-rpcs", NAMESPACE)
        .with_revision(REVISION)
        .with_rpc(remove)
}

/// Input of `remove-node-from-topology`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoveNodeInput {
    /// The topology to remove from.
    pub topology_id: String,
    /// The nodes to remove.
    pub node_ids: Vec<String>,
}

impl FromNode for RemoveNodeInput {
    fn from_node(node: ContainerNode) -> Result<Self, Status> {
        let topology_id = node
            .required_leaf(&q("topology-id"))?
            .as_str()
            .unwrap_or_default()
            .to_owned();

        let node_ids = match node.child(&q("node-ids")) {
            Some(DataNode::LeafList(ids)) => ids
                .values()
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        };

        Ok(RemoveNodeInput {
            topology_id,
            node_ids,
        })
    }
}

/// Output of `remove-node-from-topology`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoveNodeOutput {
    /// The topology the nodes were removed from.
    pub topology_id: String,
}

impl IntoNode for RemoveNodeOutput {
    fn into_node(self, name: QName) -> ContainerNode {
        ContainerNode::new(name).with_leaf(q("topology-id"), self.topology_id)
    }
}

/// Business logic of the topology RPCs.
#[async_trait]
pub trait NetworkTopology: Send + Sync + 'static {
    /// Remove nodes from a topology.
    async fn remove_node_from_topology(
        &self,
        request: Request<RemoveNodeInput>,
    ) -> Result<Response<RemoveNodeOutput>, Status>;
}

/// Registers a [`NetworkTopology`] implementation with a device.
#[derive(Debug)]
pub struct NetworkTopologyServer<T> {
    inner: Arc<T>,
}

impl<T: NetworkTopology> NetworkTopologyServer<T> {
    /// Serve `inner`.
    pub fn new(inner: T) -> Self {
        Self::from_arc(Arc::new(inner))
    }

    /// Serve an already shared `inner`.
    pub fn from_arc(inner: Arc<T>) -> Self {
        NetworkTopologyServer { inner }
    }

    /// Add `remove-node-from-topology` to `builder`.
    pub fn register(self, builder: DeviceBuilder) -> DeviceBuilder {
        let schema = builder.schema().clone();

        builder.add(RpcDispatcher::new(
            q("remove-node-from-topology"),
            RemoveNodeSvc(self.inner),
            XmlCodec::<RemoveNodeOutput, RemoveNodeInput>::new(schema),
        ))
    }
}

struct RemoveNodeSvc<T>(Arc<T>);

impl<T> Clone for RemoveNodeSvc<T> {
    fn clone(&self) -> Self {
        RemoveNodeSvc(self.0.clone())
    }
}

impl<T: NetworkTopology> RpcService<RemoveNodeInput> for RemoveNodeSvc<T> {
    type Response = RemoveNodeOutput;
    type Future = BoxFuture<'static, Result<Response<RemoveNodeOutput>, Status>>;

    fn call(&mut self, request: Request<RemoveNodeInput>) -> Self::Future {
        let inner = self.0.clone();
        Box::pin(async move { inner.remove_node_from_topology(request).await })
    }
}

/// An in-memory set of topologies.
#[derive(Debug, Default)]
pub struct SimulatedTopology {
    topologies: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl SimulatedTopology {
    /// An empty topology store.
    pub fn new() -> Self {
        SimulatedTopology::default()
    }

    /// Add topology `id` containing `nodes`.
    pub async fn insert(
        &self,
        id: impl Into<String>,
        nodes: impl IntoIterator<Item = impl Into<String>>,
    ) {
        let nodes = nodes.into_iter().map(Into::into).collect();
        self.topologies.write().await.insert(id.into(), nodes);
    }

    /// The nodes of topology `id`.
    pub async fn nodes(&self, id: &str) -> Option<Vec<String>> {
        let topologies = self.topologies.read().await;
        topologies.get(id).map(|nodes| nodes.iter().cloned().collect())
    }
}

#[async_trait]
impl NetworkTopology for SimulatedTopology {
    async fn remove_node_from_topology(
        &self,
        request: Request<RemoveNodeInput>,
    ) -> Result<Response<RemoveNodeOutput>, Status> {
        let input = request.into_inner();
        let mut topologies = self.topologies.write().await;

        let nodes = topologies.get_mut(&input.topology_id).ok_or_else(|| {
            Status::data_missing(format!("no topology {}", input.topology_id))
                .with_bad_element("topology-id")
        })?;

        for id in &input.node_ids {
            if !nodes.remove(id) {
                debug!("node {} is not in topology {}", id, input.topology_id);
            }
        }

        Ok(Response::new(RemoveNodeOutput {
            topology_id: input.topology_id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netconf_rpc::LeafListNode;

    #[tokio::test]
    async fn removes_nodes() {
        let topology = SimulatedTopology::new();
        topology.insert("topo-1", ["a", "b", "c"]).await;

        let input = RemoveNodeInput {
            topology_id: "topo-1".to_owned(),
            node_ids: vec!["a".to_owned(), "z".to_owned()],
        };
        let output = topology
            .remove_node_from_topology(Request::new(input))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(output.topology_id, "topo-1");
        assert_eq!(topology.nodes("topo-1").await.unwrap(), ["b", "c"]);
    }

    #[tokio::test]
    async fn unknown_topology() {
        let topology = SimulatedTopology::new();
        let input = RemoveNodeInput {
            topology_id: "nope".to_owned(),
            node_ids: Vec::new(),
        };

        let err = topology
            .remove_node_from_topology(Request::new(input))
            .await
            .unwrap_err();
        assert_eq!(err.tag(), netconf_rpc::ErrorTag::DataMissing);
    }

    #[test]
    fn input_from_node() {
        let node = ContainerNode::new(q("input"))
            .with_leaf(q("topology-id"), "topo-1")
            .with_child(DataNode::LeafList(LeafListNode::new(
                q("node-ids"),
                [Value::from("a"), Value::from("b")],
            )));

        let input = RemoveNodeInput::from_node(node).unwrap();
        assert_eq!(input.node_ids, ["a", "b"]);
    }
}
