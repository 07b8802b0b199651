use crate::reply;
use crate::schema::{SchemaPath, SchemaRegistry};
use crate::server::Dispatch;
use crate::xml::Element;
use crate::{ns, OperationDescriptor, OperationKind, QName, Status};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// The operation table of a device.
///
/// Every registered [`OperationDescriptor`] maps to exactly one dispatcher.
/// RPCs are looked up by qualified name, actions by their absolute schema
/// path.
#[derive(Clone)]
pub struct Router {
    schema: Arc<dyn SchemaRegistry>,
    rpcs: HashMap<QName, Arc<dyn Dispatch>>,
    actions: HashMap<SchemaPath, Arc<dyn Dispatch>>,
}

impl Router {
    /// An empty table validating registrations against `schema`.
    pub fn new(schema: Arc<dyn SchemaRegistry>) -> Self {
        Router {
            schema,
            rpcs: HashMap::new(),
            actions: HashMap::new(),
        }
    }

    /// The schema operations are registered against.
    pub fn schema(&self) -> &Arc<dyn SchemaRegistry> {
        &self.schema
    }

    /// Register `dispatcher`.
    ///
    /// Fails if its operation is not defined in the schema, is defined as the
    /// other kind of operation, or already has a dispatcher.
    pub fn add<D: Dispatch>(&mut self, dispatcher: D) -> Result<&mut Self, RegistrationError> {
        let descriptor = dispatcher.descriptor().clone();

        match self.schema.operation(descriptor.path()) {
            None => return Err(RegistrationError::new(Kind::NotInSchema, descriptor)),
            Some(operation) if operation.kind() != descriptor.kind() => {
                return Err(RegistrationError::new(Kind::KindMismatch, descriptor))
            }
            Some(_) => {}
        }

        let occupied = match descriptor.kind() {
            OperationKind::Rpc => self.rpcs.contains_key(descriptor.name()),
            OperationKind::Action => self.actions.contains_key(descriptor.path()),
        };
        if occupied {
            return Err(RegistrationError::new(Kind::Duplicate, descriptor));
        }

        let dispatcher: Arc<dyn Dispatch> = Arc::new(dispatcher);
        match descriptor.kind() {
            OperationKind::Rpc => self.rpcs.insert(descriptor.name().clone(), dispatcher),
            OperationKind::Action => self.actions.insert(descriptor.path().clone(), dispatcher),
        };

        trace!("registered {}", descriptor);
        Ok(self)
    }

    /// Descriptors of every registered operation.
    pub fn descriptors(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.rpcs
            .values()
            .chain(self.actions.values())
            .map(|dispatcher| dispatcher.descriptor())
    }

    /// Find the dispatcher an `<rpc>` document addresses.
    ///
    /// The envelope must be a NETCONF `<rpc>` carrying a `message-id` and
    /// exactly one operation element. An `<action>` is routed by the path of
    /// the operation element inside it.
    pub fn route(&self, rpc: &Element) -> Result<&dyn Dispatch, Status> {
        reply::check_envelope(rpc)?;

        let operation = match rpc.children() {
            [operation] => operation,
            [] => return Err(Status::malformed_message("<rpc> carries no operation")),
            _ => return Err(Status::malformed_message("<rpc> carries more than one operation")),
        };

        let found = if operation.name().is(ns::YANG_1, "action") {
            self.route_action(operation)?
        } else {
            self.rpcs.get(operation.name())
        };

        match found {
            Some(dispatcher) => {
                trace!("routed to {}", dispatcher.descriptor());
                Ok(&**dispatcher)
            }
            None => {
                debug!("no operation registered for {}", operation.name());
                Err(Status::operation_not_supported(format!(
                    "operation {} is not supported",
                    operation.name()
                ))
                .with_bad_element(operation.name().local_name()))
            }
        }
    }

    fn route_action(&self, action: &Element) -> Result<Option<&Arc<dyn Dispatch>>, Status> {
        match action.children() {
            [root] => Ok(self.find_action(root, SchemaPath::root())),
            _ => Err(Status::malformed_message(
                "<action> must carry exactly one data tree",
            )),
        }
    }

    fn find_action(&self, element: &Element, parent: SchemaPath) -> Option<&Arc<dyn Dispatch>> {
        let path = parent.child(element.name().clone());

        if let Some(dispatcher) = self.actions.get(&path) {
            return Some(dispatcher);
        }

        element
            .children()
            .iter()
            .find_map(|child| self.find_action(child, path.clone()))
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("rpcs", &self.rpcs.keys().collect::<Vec<_>>())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Error returned when an operation cannot be registered.
#[derive(Debug)]
pub struct RegistrationError {
    kind: Kind,
    descriptor: OperationDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Duplicate,
    NotInSchema,
    KindMismatch,
}

impl RegistrationError {
    fn new(kind: Kind, descriptor: OperationDescriptor) -> Self {
        RegistrationError { kind, descriptor }
    }

    /// The operation that was being registered.
    pub fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }

    /// Returns `true` if the operation already had a dispatcher.
    pub fn is_duplicate(&self) -> bool {
        self.kind == Kind::Duplicate
    }

    /// Returns `true` if the schema does not define the operation.
    pub fn is_not_in_schema(&self) -> bool {
        self.kind == Kind::NotInSchema
    }
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Kind::Duplicate => write!(f, "{} is already registered", self.descriptor),
            Kind::NotInSchema => write!(f, "{} is not defined in the schema", self.descriptor),
            Kind::KindMismatch => write!(
                f,
                "{} is defined in the schema as a different kind of operation",
                self.descriptor
            ),
        }
    }
}

impl std::error::Error for RegistrationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::NodeCodec;
    use crate::schema::{ContainerSchema, ListSchema, LeafSchema, LeafType, Module, OperationSchema, SchemaContext};
    use crate::server::{ActionDispatcher, RpcDispatcher};
    use crate::{ContainerNode, ErrorTag, ErrorType, InstanceIdentifier, Request, Response};
    use tower::service_fn;

    const NS: &str = "urn:example:router";

    fn q(local: &str) -> QName {
        QName::new(NS, local)
    }

    fn schema() -> Arc<dyn SchemaRegistry> {
        let server = ListSchema::new(q("server"), [q("name")])
            .with_child(LeafSchema::new(q("name"), LeafType::String))
            .with_action(OperationSchema::action(q("reset")));

        Arc::new(
            SchemaContext::new().with_module(
                Module::new("router", NS)
                    .with_data(ContainerSchema::new(q("servers")).with_child(server))
                    .with_rpc(OperationSchema::rpc(q("ping"))),
            ),
        )
    }

    fn ping(schema: &Arc<dyn SchemaRegistry>, name: &str) -> impl Dispatch {
        let svc = service_fn(|_: Request<ContainerNode>| async {
            Ok::<_, Status>(Response::new(ContainerNode::new(q("output"))))
        });
        RpcDispatcher::new(q(name), svc, NodeCodec::new(schema.clone()))
    }

    fn reset(schema: &Arc<dyn SchemaRegistry>, parent: SchemaPath) -> impl Dispatch {
        let svc = service_fn(|(_, _): (InstanceIdentifier, Request<ContainerNode>)| async {
            Ok::<_, Status>(Response::new(ContainerNode::new(q("output"))))
        });
        ActionDispatcher::new(parent, q("reset"), svc, NodeCodec::new(schema.clone()), schema.clone())
    }

    fn servers() -> SchemaPath {
        SchemaPath::new([q("servers"), q("server")])
    }

    fn router() -> Router {
        let schema = schema();
        let mut router = Router::new(schema.clone());
        router.add(ping(&schema, "ping")).unwrap();
        router.add(reset(&schema, servers())).unwrap();
        router
    }

    fn rpc(body: &str) -> Element {
        Element::parse(&format!(
            "<rpc xmlns=\"{}\" message-id=\"1\">{}</rpc>",
            ns::NETCONF_BASE,
            body
        ))
        .unwrap()
    }

    #[test]
    fn routes_rpcs_and_actions() {
        let router = router();

        let request = rpc(&format!("<ping xmlns=\"{}\"/>", NS));
        assert_eq!(router.route(&request).unwrap().descriptor().name(), &q("ping"));

        let request = rpc(&format!(
            "<action xmlns=\"{}\"><servers xmlns=\"{}\"><server><name>a</name><reset/></server></servers></action>",
            ns::YANG_1,
            NS
        ));
        let dispatcher = router.route(&request).unwrap();
        assert_eq!(dispatcher.descriptor().path(), &servers().child(q("reset")));
        assert_eq!(dispatcher.descriptor().kind(), OperationKind::Action);

        assert_eq!(router.descriptors().count(), 2);
    }

    #[test]
    fn unknown_operation() {
        let router = router();
        let request = rpc("<reboot xmlns=\"urn:example:other\"/>");

        let err = router.route(&request).map(|_| ()).unwrap_err();
        assert_eq!(err.tag(), ErrorTag::OperationNotSupported);
        assert_eq!(err.error_type(), ErrorType::Protocol);
        assert_eq!(err.info().bad_element.as_deref(), Some("reboot"));
    }

    #[test]
    fn malformed_envelopes() {
        let router = router();

        let err = router.route(&rpc("")).map(|_| ()).unwrap_err();
        assert_eq!(err.tag(), ErrorTag::MalformedMessage);

        let two = rpc(&format!("<ping xmlns=\"{0}\"/><ping xmlns=\"{0}\"/>", NS));
        let err = router.route(&two).map(|_| ()).unwrap_err();
        assert_eq!(err.tag(), ErrorTag::MalformedMessage);

        let not_rpc = Element::parse(&format!("<ping xmlns=\"{}\"/>", NS)).unwrap();
        let err = router.route(&not_rpc).map(|_| ()).unwrap_err();
        assert_eq!(err.tag(), ErrorTag::MalformedMessage);
    }

    #[test]
    fn registration_is_one_to_one() {
        let schema = schema();
        let mut router = Router::new(schema.clone());
        router.add(ping(&schema, "ping")).unwrap();

        let err = router.add(ping(&schema, "ping")).map(|_| ()).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(err.descriptor().name(), &q("ping"));

        let err = router.add(ping(&schema, "pong")).map(|_| ()).unwrap_err();
        assert!(err.is_not_in_schema());

        // the action exists, but not at the top level
        let err = router
            .add(reset(&schema, SchemaPath::new([q("server")])))
            .map(|_| ())
            .unwrap_err();
        assert!(err.is_not_in_schema());
        assert!(!err.is_duplicate());
    }

    #[test]
    fn kind_mismatch() {
        let schema = schema();
        let mut router = Router::new(schema.clone());

        let svc = service_fn(|(_, _): (InstanceIdentifier, Request<ContainerNode>)| async {
            Ok::<_, Status>(Response::new(ContainerNode::new(q("output"))))
        });
        let as_action = ActionDispatcher::new(SchemaPath::root(), q("ping"), svc, NodeCodec::new(schema.clone()), schema.clone());

        let err = router.add(as_action).map(|_| ()).unwrap_err();
        assert!(err.to_string().contains("different kind"));
    }
}
