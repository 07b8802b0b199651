use super::{bridge, ActionService, PendingResponse, RpcService};
use crate::codec::{Codec, DecodeBuf, Decoder};
use crate::identity::{self, InstanceIdentifier};
use crate::rt::SharedExec;
use crate::schema::{SchemaPath, SchemaRegistry};
use crate::xml::Element;
use crate::{Extensions, OperationDescriptor, OperationMethod, QName, Request, Status};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// One registered operation.
///
/// A dispatcher owns the descriptor of its operation and carries a request
/// from the raw `<rpc>` element to a [`PendingResponse`]. It resolves the
/// operation identity, decodes the input and invokes the handler, in that
/// order. Malformed input and unresolved identity fail synchronously with
/// `Err` and the handler is not called. Handler outcomes, failures included,
/// only ever arrive through the returned `PendingResponse`.
pub trait Dispatch: Send + Sync + 'static {
    /// The operation this dispatcher serves.
    fn descriptor(&self) -> &OperationDescriptor;

    /// Dispatch `rpc` with the given invocation context.
    fn dispatch_with(&self, rpc: &Element, cx: DispatchContext) -> Result<PendingResponse, Status>;

    /// Dispatch `rpc` on the ambient tokio runtime with no extensions.
    fn dispatch(&self, rpc: &Element) -> Result<PendingResponse, Status> {
        self.dispatch_with(rpc, DispatchContext::default())
    }
}

/// Per-invocation state handed to a [`Dispatch`].
#[derive(Clone, Debug, Default)]
pub struct DispatchContext {
    executor: SharedExec,
    extensions: Extensions,
}

impl DispatchContext {
    /// A context observing completions on `executor`.
    pub fn new(executor: SharedExec) -> Self {
        DispatchContext {
            executor,
            extensions: Extensions::default(),
        }
    }

    /// Replace the executor.
    #[must_use]
    pub fn with_executor(self, executor: SharedExec) -> Self {
        DispatchContext { executor, ..self }
    }

    /// Replace the extensions the handler request starts out with.
    #[must_use]
    pub fn with_extensions(self, extensions: Extensions) -> Self {
        DispatchContext { extensions, ..self }
    }

    /// Add one extension.
    #[must_use]
    pub fn with_extension<T>(mut self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.extensions.insert(value);
        self
    }

    /// The executor completions are observed on.
    pub fn executor(&self) -> &SharedExec {
        &self.executor
    }

    /// The extensions the handler request starts out with.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}

fn decode<C: Codec>(
    codec: &mut C,
    input: &Element,
    descriptor: &OperationDescriptor,
) -> Result<C::Decode, Status> {
    let path = descriptor.input_path();
    codec.decoder().decode(&mut DecodeBuf::new(input, &path))
}

fn request<T>(extensions: Extensions, descriptor: &OperationDescriptor, message: T) -> Request<T> {
    let mut request = Request::from_parts(extensions, message);
    request
        .extensions_mut()
        .insert(OperationMethod::new(descriptor.clone()));
    request
}

/// Dispatches a global RPC to an [`RpcService`].
pub struct RpcDispatcher<S, C> {
    descriptor: OperationDescriptor,
    service: S,
    codec: C,
}

impl<S, C> RpcDispatcher<S, C> {
    /// Serve the RPC `name` with `service`, converting payloads with `codec`.
    pub fn new(name: QName, service: S, codec: C) -> Self {
        RpcDispatcher {
            descriptor: OperationDescriptor::rpc(name),
            service,
            codec,
        }
    }
}

impl<S, C> Dispatch for RpcDispatcher<S, C>
where
    C: Codec + Clone + Send + Sync + 'static,
    S: RpcService<C::Decode, Response = C::Encode> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
{
    fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }

    fn dispatch_with(&self, rpc: &Element, cx: DispatchContext) -> Result<PendingResponse, Status> {
        let descriptor = &self.descriptor;
        trace!("dispatching {}", descriptor);

        let mut codec = self.codec.clone();
        let input = identity::rpc_input(rpc, descriptor)
            .and_then(|input| decode(&mut codec, input, descriptor))
            .map_err(|status| {
                debug!("rejected {}: {}", descriptor, status);
                status
            })?;

        let mut service = self.service.clone();
        let future = RpcService::call(&mut service, request(cx.extensions, descriptor, input));

        Ok(bridge::invoke(
            &cx.executor,
            future,
            codec.encoder(),
            descriptor.output_path(),
        ))
    }
}

impl<S, C> fmt::Debug for RpcDispatcher<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcDispatcher")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Dispatches an action to an [`ActionService`].
///
/// Before the handler runs, the list entry the action was invoked on is
/// resolved into an [`InstanceIdentifier`] using the keys found inside that
/// entry.
pub struct ActionDispatcher<S, C> {
    descriptor: OperationDescriptor,
    service: S,
    codec: C,
    schema: Arc<dyn SchemaRegistry>,
}

impl<S, C> ActionDispatcher<S, C> {
    /// Serve the action `name` defined on the data node at `parent`.
    ///
    /// `schema` is consulted to tell keyed lists from containers along the
    /// path.
    pub fn new(
        parent: SchemaPath,
        name: QName,
        service: S,
        codec: C,
        schema: Arc<dyn SchemaRegistry>,
    ) -> Self {
        ActionDispatcher {
            descriptor: OperationDescriptor::action(parent, name),
            service,
            codec,
            schema,
        }
    }

    fn resolve<'a>(&self, rpc: &'a Element) -> Result<(&'a Element, InstanceIdentifier), Status> {
        identity::resolve_action(rpc, &self.descriptor, &*self.schema)
    }
}

impl<S, C> Dispatch for ActionDispatcher<S, C>
where
    C: Codec + Clone + Send + Sync + 'static,
    S: ActionService<C::Decode, Response = C::Encode> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
{
    fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }

    fn dispatch_with(&self, rpc: &Element, cx: DispatchContext) -> Result<PendingResponse, Status> {
        let descriptor = &self.descriptor;
        trace!("dispatching {}", descriptor);

        let mut codec = self.codec.clone();
        let (target, input) = self
            .resolve(rpc)
            .and_then(|(input, target)| Ok((target, decode(&mut codec, input, descriptor)?)))
            .map_err(|status| {
                debug!("rejected {}: {}", descriptor, status);
                status
            })?;

        trace!("{} targets {}", descriptor, target);
        let mut service = self.service.clone();
        let future = ActionService::call(
            &mut service,
            target,
            request(cx.extensions, descriptor, input),
        );

        Ok(bridge::invoke(
            &cx.executor,
            future,
            codec.encoder(),
            descriptor.output_path(),
        ))
    }
}

impl<S, C> fmt::Debug for ActionDispatcher<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::NodeCodec;
    use crate::schema::{LeafSchema, LeafType, ListSchema, Module, OperationSchema, SchemaContext};
    use crate::{ns, ContainerNode, ErrorTag, ErrorType, Response, SessionId, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::service_fn;

    const NS: &str = "urn:example:dispatch";

    fn q(local: &str) -> QName {
        QName::new(NS, local)
    }

    fn schema() -> Arc<dyn SchemaRegistry> {
        let reset = OperationSchema::action(q("reset"))
            .with_input(LeafSchema::new(q("reset-at"), LeafType::DateAndTime).mandatory())
            .with_output(LeafSchema::new(q("reset-finished-at"), LeafType::DateAndTime));

        let server = ListSchema::new(q("server"), [q("name")])
            .with_child(LeafSchema::new(q("name"), LeafType::String))
            .with_action(reset);

        let echo = OperationSchema::rpc(q("echo"))
            .with_input(LeafSchema::new(q("text"), LeafType::String).mandatory())
            .with_output(LeafSchema::new(q("text"), LeafType::String));

        Arc::new(SchemaContext::new().with_module(
            Module::new("dispatch", NS)
                .with_data(server)
                .with_rpc(echo),
        ))
    }

    fn rpc(body: &str) -> Element {
        Element::parse(&format!(
            "<rpc xmlns=\"{}\" message-id=\"7\">{}</rpc>",
            ns::NETCONF_BASE,
            body
        ))
        .unwrap()
    }

    fn reset_request(body: &str) -> Element {
        rpc(&format!(
            "<action xmlns=\"{}\"><server xmlns=\"{}\">{}</server></action>",
            ns::YANG_1,
            NS,
            body
        ))
    }

    #[tokio::test]
    async fn rpc_round_trip() {
        let schema = schema();
        let echo = service_fn(|request: Request<ContainerNode>| async move {
            assert_eq!(request.operation().map(|op| op.name().local_name()), Some("echo"));
            assert_eq!(request.session_id(), Some(SessionId::new(3)));
            Ok::<_, Status>(Response::new(request.into_inner()))
        });

        let dispatcher = RpcDispatcher::new(q("echo"), echo, NodeCodec::new(schema));
        let cx = DispatchContext::default().with_extension(SessionId::new(3));

        let request = rpc(&format!("<echo xmlns=\"{}\"><text>hi</text></echo>", NS));
        let output = dispatcher.dispatch_with(&request, cx).unwrap().await.unwrap();

        assert_eq!(output, [Element::new(q("text")).with_text("hi")]);
    }

    #[tokio::test]
    async fn action_receives_target() {
        let schema = schema();
        let reset = service_fn(
            |(target, request): (InstanceIdentifier, Request<ContainerNode>)| async move {
                let key = target.target_key().and_then(|key| key.get(&q("name"))).cloned();
                assert_eq!(key, Some(Value::from("server-1")));
                assert_eq!(
                    request.get_ref().leaf(&q("reset-at")),
                    Some(&Value::from("2020-09-03T16:20:00Z"))
                );

                Ok::<_, Status>(Response::new(
                    ContainerNode::new(q("output")).with_leaf(q("reset-finished-at"), "2020-09-03T16:20:00Z"),
                ))
            },
        );

        let dispatcher = ActionDispatcher::new(
            SchemaPath::new([q("server")]),
            q("reset"),
            reset,
            NodeCodec::new(schema.clone()),
            schema,
        );

        let request = reset_request(
            "<name>server-1</name><reset><reset-at>2020-09-03T16:20:00Z</reset-at></reset>",
        );
        let output = dispatcher.dispatch(&request).unwrap().await.unwrap();

        assert_eq!(
            output,
            [Element::new(q("reset-finished-at")).with_text("2020-09-03T16:20:00Z")]
        );
    }

    #[tokio::test]
    async fn synchronous_failures_skip_the_handler() {
        let schema = schema();
        let calls = Arc::new(AtomicUsize::new(0));

        let counted = calls.clone();
        let reset = service_fn(move |(_, _): (InstanceIdentifier, Request<ContainerNode>)| {
            counted.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, Status>(Response::new(ContainerNode::new(q("output")))) }
        });

        let dispatcher = ActionDispatcher::new(
            SchemaPath::new([q("server")]),
            q("reset"),
            reset,
            NodeCodec::new(schema.clone()),
            schema,
        );

        let missing_key = reset_request("<reset><reset-at>2020-09-03T16:20:00Z</reset-at></reset>");
        let err = dispatcher.dispatch(&missing_key).unwrap_err();
        assert_eq!(err.tag(), ErrorTag::MissingElement);
        assert_eq!(err.error_type(), ErrorType::Protocol);

        let bad_input = reset_request("<name>server-1</name><reset><reset-at>yesterday</reset-at></reset>");
        let err = dispatcher.dispatch(&bad_input).unwrap_err();
        assert_eq!(err.tag(), ErrorTag::InvalidValue);
        assert_eq!(err.error_type(), ErrorType::Application);

        let missing_input = reset_request("<name>server-1</name><reset/>");
        let err = dispatcher.dispatch(&missing_input).unwrap_err();
        assert_eq!(err.tag(), ErrorTag::MissingElement);
        assert_eq!(err.error_type(), ErrorType::Application);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handler_failure_arrives_through_the_response() {
        let schema = schema();
        let echo = service_fn(|_: Request<ContainerNode>| async {
            Err::<Response<ContainerNode>, _>(Status::resource_denied("toaster busy"))
        });

        let dispatcher = RpcDispatcher::new(q("echo"), echo, NodeCodec::new(schema));
        let request = rpc(&format!("<echo xmlns=\"{}\"><text>hi</text></echo>", NS));

        let pending = dispatcher.dispatch(&request).unwrap();
        let err = pending.await.unwrap_err();

        assert_eq!(err.tag(), ErrorTag::ResourceDenied);
        assert_eq!(err.message(), "toaster busy");
    }
}
