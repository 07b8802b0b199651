//! The classic `toaster` model: `make-toast` and `cancel-toast` RPCs and the
//! `toastDone` notification.

use netconf_rpc::codec::{FromNode, IntoNode, XmlCodec};
use netconf_rpc::notification::NotificationPublisher;
use netconf_rpc::schema::{LeafSchema, LeafType, Module, OperationSchema};
use netconf_rpc::server::{RpcDispatcher, RpcService};
use netconf_rpc::{async_trait, BoxFuture, ContainerNode, DeviceBuilder, QName, Request, Response, Status, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Namespace of the `toaster` module.
pub const NAMESPACE: &str = "http://netconfcentral.org/ns/toaster";

/// Revision of the `toaster` module.
pub const REVISION: &str = "2009-11-20";

const DEFAULT_DONENESS: u32 = 5;
const DEFAULT_TOAST_TYPE: &str = "toast:wheat-bread";

fn q(local: &str) -> QName {
    QName::new(NAMESPACE, local)
}

/// The `toaster` module.
pub fn module() -> Module {
    let make_toast = OperationSchema::rpc(q("make-toast"))
        .with_input(LeafSchema::new(q("toasterDoneness"), LeafType::Uint32))
        .with_input(LeafSchema::new(q("toasterToastType"), LeafType::String));

    Module::new("toaster", NAMESPACE)
        .with_revision(REVISION)
        .with_rpc(make_toast)
        .with_rpc(OperationSchema::rpc(q("cancel-toast")))
}

/// Input of `make-toast`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MakeToastInput {
    /// How done the toast should be, 1 to 10. Defaults to 5.
    pub doneness: u32,
    /// The kind of bread, an identity of the `toast-type` base.
    pub toast_type: String,
}

impl FromNode for MakeToastInput {
    fn from_node(node: ContainerNode) -> Result<Self, Status> {
        let doneness = match node.leaf(&q("toasterDoneness")).and_then(Value::as_u64) {
            Some(doneness) => u32::try_from(doneness)
                .map_err(|_| Status::invalid_value("toasterDoneness out of range"))?,
            None => DEFAULT_DONENESS,
        };

        let toast_type = node
            .leaf(&q("toasterToastType"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_TOAST_TYPE)
            .to_owned();

        Ok(MakeToastInput {
            doneness,
            toast_type,
        })
    }
}

/// How a toast ended, reported by `toastDone`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastStatus {
    /// The toast is done.
    Done,
    /// The toast was cancelled.
    Cancelled,
    /// The toaster failed.
    Error,
}

impl ToastStatus {
    fn as_str(self) -> &'static str {
        match self {
            ToastStatus::Done => "done",
            ToastStatus::Cancelled => "cancelled",
            ToastStatus::Error => "error",
        }
    }
}

/// The `toastDone` notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToastDone {
    /// How the toast ended.
    pub status: ToastStatus,
}

impl ToastDone {
    /// The notification name.
    pub fn name() -> QName {
        q("toastDone")
    }
}

impl IntoNode for ToastDone {
    fn into_node(self, name: QName) -> ContainerNode {
        ContainerNode::new(name).with_leaf(q("toastStatus"), Value::Enumeration(self.status.as_str().to_owned()))
    }
}

/// Business logic of the toaster RPCs.
#[async_trait]
pub trait Toaster: Send + Sync + 'static {
    /// Make a piece of toast.
    async fn make_toast(&self, request: Request<MakeToastInput>) -> Result<Response<()>, Status>;

    /// Stop toasting.
    async fn cancel_toast(&self, request: Request<()>) -> Result<Response<()>, Status>;
}

/// Registers a [`Toaster`] implementation with a device.
#[derive(Debug)]
pub struct ToasterServer<T> {
    inner: Arc<T>,
}

impl<T: Toaster> ToasterServer<T> {
    /// Serve `inner`.
    pub fn new(inner: T) -> Self {
        Self::from_arc(Arc::new(inner))
    }

    /// Serve an already shared `inner`.
    pub fn from_arc(inner: Arc<T>) -> Self {
        ToasterServer { inner }
    }

    /// Add `make-toast` and `cancel-toast` to `builder`.
    pub fn register(self, builder: DeviceBuilder) -> DeviceBuilder {
        let schema = builder.schema().clone();

        let make_toast = RpcDispatcher::new(
            q("make-toast"),
            MakeToastSvc(self.inner.clone()),
            XmlCodec::<(), MakeToastInput>::new(schema.clone()),
        );
        let cancel_toast = RpcDispatcher::new(
            q("cancel-toast"),
            CancelToastSvc(self.inner),
            XmlCodec::<(), ()>::new(schema),
        );

        builder.add(make_toast).add(cancel_toast)
    }
}

struct MakeToastSvc<T>(Arc<T>);

impl<T> Clone for MakeToastSvc<T> {
    fn clone(&self) -> Self {
        MakeToastSvc(self.0.clone())
    }
}

impl<T: Toaster> RpcService<MakeToastInput> for MakeToastSvc<T> {
    type Response = ();
    type Future = BoxFuture<'static, Result<Response<()>, Status>>;

    fn call(&mut self, request: Request<MakeToastInput>) -> Self::Future {
        let inner = self.0.clone();
        Box::pin(async move { inner.make_toast(request).await })
    }
}

struct CancelToastSvc<T>(Arc<T>);

impl<T> Clone for CancelToastSvc<T> {
    fn clone(&self) -> Self {
        CancelToastSvc(self.0.clone())
    }
}

impl<T: Toaster> RpcService<()> for CancelToastSvc<T> {
    type Response = ();
    type Future = BoxFuture<'static, Result<Response<()>, Status>>;

    fn call(&mut self, request: Request<()>) -> Self::Future {
        let inner = self.0.clone();
        Box::pin(async move { inner.cancel_toast(request).await })
    }
}

/// A toaster that toasts instantly and reports every toast through
/// `toastDone`.
#[derive(Debug)]
pub struct SimulatedToaster {
    notifications: NotificationPublisher,
    toasts: Mutex<Vec<MakeToastInput>>,
}

impl SimulatedToaster {
    /// A toaster raising notifications through `notifications`.
    pub fn new(notifications: NotificationPublisher) -> Self {
        SimulatedToaster {
            notifications,
            toasts: Mutex::new(Vec::new()),
        }
    }

    /// Every toast made so far.
    pub async fn toasts(&self) -> Vec<MakeToastInput> {
        self.toasts.lock().await.clone()
    }
}

#[async_trait]
impl Toaster for SimulatedToaster {
    async fn make_toast(&self, request: Request<MakeToastInput>) -> Result<Response<()>, Status> {
        let input = request.into_inner();
        if !(1..=10).contains(&input.doneness) {
            return Err(Status::invalid_value(format!(
                "toasterDoneness must be between 1 and 10, got {}",
                input.doneness
            ))
            .with_bad_element("toasterDoneness"));
        }

        debug!("making {} toast, doneness {}", input.toast_type, input.doneness);
        self.toasts.lock().await.push(input);

        self.notifications.publish(
            ToastDone {
                status: ToastStatus::Done,
            },
            ToastDone::name(),
        );
        Ok(Response::new(()))
    }

    async fn cancel_toast(&self, _: Request<()>) -> Result<Response<()>, Status> {
        debug!("toast cancelled");
        self.notifications.publish(
            ToastDone {
                status: ToastStatus::Cancelled,
            },
            ToastDone::name(),
        );
        Ok(Response::new(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_toast_defaults() {
        let input = MakeToastInput::from_node(ContainerNode::new(q("input"))).unwrap();
        assert_eq!(input.doneness, DEFAULT_DONENESS);
        assert_eq!(input.toast_type, DEFAULT_TOAST_TYPE);

        let node = ContainerNode::new(q("input"))
            .with_leaf(q("toasterDoneness"), 9_u64)
            .with_leaf(q("toasterToastType"), "toast:frozen-waffle");
        let input = MakeToastInput::from_node(node).unwrap();
        assert_eq!(input.doneness, 9);
        assert_eq!(input.toast_type, "toast:frozen-waffle");
    }

    #[test]
    fn toast_done_node() {
        let node = ToastDone {
            status: ToastStatus::Cancelled,
        }
        .into_node(ToastDone::name());

        assert_eq!(
            node.leaf(&q("toastStatus")),
            Some(&Value::Enumeration("cancelled".to_owned()))
        );
    }
}
