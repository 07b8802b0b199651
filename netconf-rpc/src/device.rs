use crate::notification::{BindingHandle, NotificationPublisher, NotificationStream};
use crate::reply;
use crate::rt::{BoxFuture, Executor, SharedExec};
use crate::schema::SchemaRegistry;
use crate::server::{Dispatch, DispatchContext, PendingResponse};
use crate::xml::{Attribute, Element};
use crate::{ns, RegistrationError, Router, SessionId};
use pin_project::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use tracing::{debug, trace};

/// A device: its registered operations and its notification binding.
///
/// Cloning a device is cheap and every clone shares the same operation table
/// and notification binding.
///
/// ```rust
/// use netconf_rpc::codec::NodeCodec;
/// use netconf_rpc::schema::{Module, OperationSchema, SchemaContext};
/// use netconf_rpc::server::RpcDispatcher;
/// use netconf_rpc::{ContainerNode, Device, QName, Request, Response, SessionId, Status};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// const NS: &str = "urn:example:ping";
/// let ping = QName::new(NS, "ping");
///
/// let schema = Arc::new(
///     SchemaContext::new().with_module(Module::new("ping", NS).with_rpc(OperationSchema::rpc(ping.clone()))),
/// );
/// let handler = tower::service_fn(|_: Request<ContainerNode>| async {
///     Ok::<_, Status>(Response::new(ContainerNode::new(QName::new(NS, "output"))))
/// });
///
/// let device = Device::builder(schema.clone())
///     .add(RpcDispatcher::new(ping, handler, NodeCodec::new(schema)))
///     .build()
///     .unwrap();
///
/// let (service, _notifications) = device.operation_service(SessionId::new(1));
/// let reply = service
///     .handle(r#"<rpc xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" message-id="1"><ping xmlns="urn:example:ping"/></rpc>"#)
///     .await;
///
/// assert_eq!(
///     reply.to_string(),
///     r#"<rpc-reply xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" message-id="1"><ok/></rpc-reply>"#
/// );
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Device {
    router: Arc<Router>,
    executor: SharedExec,
    notifications: NotificationPublisher,
}

impl Device {
    /// Start configuring a device whose operations are defined by `schema`.
    pub fn builder(schema: Arc<dyn SchemaRegistry>) -> DeviceBuilder {
        DeviceBuilder {
            router: Router::new(schema),
            executor: SharedExec::tokio(),
            notifications: NotificationPublisher::new(),
            error: None,
        }
    }

    /// Create the operation service for a newly established session.
    ///
    /// Binds the device's notifications to `session`; they arrive on the
    /// returned stream until the service is dropped or closed, or a newer
    /// session is established.
    pub fn operation_service(&self, session: SessionId) -> (OperationService, NotificationStream) {
        let (binding, notifications) = self.notifications.on_session_established(session);
        trace!("operation service created for session {}", session);

        let service = OperationService {
            device: self.clone(),
            session,
            binding,
        };
        (service, notifications)
    }

    /// The publisher handlers use to raise notifications.
    pub fn notifications(&self) -> &NotificationPublisher {
        &self.notifications
    }

    /// The operation table.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Unbind notifications. Later publishes are dropped.
    ///
    /// Responses already dispatched still complete.
    pub fn shutdown(&self) {
        debug!("device shutting down");
        self.notifications.unbind();
    }
}

/// Builder for [`Device`].
#[derive(Debug)]
pub struct DeviceBuilder {
    router: Router,
    executor: SharedExec,
    notifications: NotificationPublisher,
    error: Option<RegistrationError>,
}

impl DeviceBuilder {
    /// Observe handler completions on `executor` instead of the ambient tokio
    /// runtime.
    #[must_use]
    pub fn executor<E>(self, executor: E) -> Self
    where
        E: Executor<BoxFuture<'static, ()>> + Send + Sync + 'static,
    {
        DeviceBuilder {
            executor: SharedExec::new(executor),
            ..self
        }
    }

    /// Register an operation.
    ///
    /// The first registration error is reported by [`build`](Self::build).
    #[must_use]
    pub fn add<D: Dispatch>(mut self, dispatcher: D) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.router.add(dispatcher) {
                self.error = Some(err);
            }
        }
        self
    }

    /// The schema operations are registered against.
    pub fn schema(&self) -> &Arc<dyn SchemaRegistry> {
        self.router.schema()
    }

    /// The publisher the finished device binds to its sessions.
    ///
    /// Handlers that raise notifications keep a clone of it.
    pub fn notifications(&self) -> &NotificationPublisher {
        &self.notifications
    }

    /// Finish the device.
    pub fn build(self) -> Result<Device, RegistrationError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        Ok(Device {
            router: Arc::new(self.router),
            executor: self.executor,
            notifications: self.notifications,
        })
    }
}

/// Answers the `<rpc>` requests of one session.
///
/// Dropping the service ends the session's notification binding.
#[derive(Debug)]
pub struct OperationService {
    device: Device,
    session: SessionId,
    binding: BindingHandle,
}

impl OperationService {
    /// The session this service answers.
    pub fn session_id(&self) -> SessionId {
        self.session
    }

    /// Answer one `<rpc>` document.
    ///
    /// The returned future always resolves to an `<rpc-reply>`. Failures,
    /// malformed documents included, become its `<rpc-error>`.
    pub fn handle(&self, document: &str) -> ReplyFuture {
        match Element::parse(document) {
            Ok(rpc) => self.handle_element(&rpc),
            Err(status) => {
                debug!("session {}: {}", self.session, status);
                ReplyFuture::new(Vec::new(), PendingResponse::ready(Err(status)))
            }
        }
    }

    /// Answer one parsed `<rpc>` element.
    pub fn handle_element(&self, rpc: &Element) -> ReplyFuture {
        let attributes = if rpc.name().is(ns::NETCONF_BASE, "rpc") {
            rpc.attributes().to_vec()
        } else {
            Vec::new()
        };

        let pending = self
            .device
            .router
            .route(rpc)
            .and_then(|dispatcher| {
                let cx = DispatchContext::new(self.device.executor.clone()).with_extension(self.session);
                dispatcher.dispatch_with(rpc, cx)
            })
            .unwrap_or_else(|status| {
                debug!("session {}: {}", self.session, status);
                PendingResponse::ready(Err(status))
            });

        ReplyFuture::new(attributes, pending)
    }

    /// End the session, releasing its notification binding.
    pub fn close(self) {
        trace!("closing session {}", self.session);
        self.device.notifications.on_session_closed(self.binding);
    }
}

/// The `<rpc-reply>` to one request.
#[pin_project]
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct ReplyFuture {
    attributes: Vec<Attribute>,
    #[pin]
    pending: PendingResponse,
}

impl ReplyFuture {
    fn new(attributes: Vec<Attribute>, pending: PendingResponse) -> Self {
        ReplyFuture {
            attributes,
            pending,
        }
    }
}

impl Future for ReplyFuture {
    type Output = Element;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let outcome = ready!(this.pending.poll(cx));
        Poll::Ready(reply::rpc_reply(this.attributes, outcome))
    }
}
