//! Device-side NETCONF operation dispatch.
//!
//! `netconf-rpc` sits between a NETCONF session transport and the business
//! logic of a simulated or real device. It takes one `<rpc>` document at a
//! time, resolves which registered operation it addresses, converts the
//! operation input into a schema-validated [`ContainerNode`], hands that to a
//! handler service and turns the handler's eventual result back into an
//! `<rpc-reply>`.
//!
//! # Layout
//!
//! - [`codec`]: the schema-addressed XML codec ([`XmlNodeConverter`]) and the
//!   typed [`XmlCodec`] built on top of it.
//! - [`identity`]: locating the input element of an operation and, for
//!   actions, the keyed list entry the action targets.
//! - [`server`]: the handler traits, the dispatchers registered per operation
//!   and the [`PendingResponse`] bridge between a handler future and the
//!   protocol reply.
//! - [`notification`]: per-session, best-effort notification delivery.
//! - [`Device`]: ties registration, routing, reply framing and notification
//!   binding together for a transport.
//!
//! # Example
//!
//! ```rust
//! use netconf_rpc::codec::NodeCodec;
//! use netconf_rpc::schema::{LeafSchema, LeafType, Module, OperationSchema, SchemaContext};
//! use netconf_rpc::server::RpcDispatcher;
//! use netconf_rpc::{ContainerNode, Device, Element, QName, Request, Response, SessionId, Status};
//! use std::sync::Arc;
//!
//! const NS: &str = "urn:example:echo";
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let echo = QName::new(NS, "echo");
//! let text = QName::new(NS, "text");
//! let module = Module::new("echo", NS).with_rpc(
//!     OperationSchema::rpc(echo.clone())
//!         .with_input(LeafSchema::new(text.clone(), LeafType::String))
//!         .with_output(LeafSchema::new(text.clone(), LeafType::String)),
//! );
//! let schema = Arc::new(SchemaContext::new().with_module(module));
//!
//! let handler = tower::service_fn(|request: Request<ContainerNode>| async move {
//!     Ok::<_, Status>(Response::new(request.into_inner()))
//! });
//!
//! let device = Device::builder(schema.clone())
//!     .add(RpcDispatcher::new(echo, handler, NodeCodec::new(schema)))
//!     .build()?;
//!
//! let (service, _notifications) = device.operation_service(SessionId::new(1));
//! let reply = service
//!     .handle(r#"<rpc xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" message-id="7">
//!                  <echo xmlns="urn:example:echo"><text>hello</text></echo>
//!                </rpc>"#)
//!     .await;
//!
//! assert_eq!(reply.child(&text).and_then(Element::text), Some("hello"));
//! # Ok(())
//! # }
//! ```
#![warn(
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod codec;
pub mod identity;
pub mod notification;
pub mod schema;
pub mod server;
pub mod xml;

mod descriptor;
mod device;
mod extensions;
mod node;
mod qname;
mod reply;
mod request;
mod response;
mod router;
mod rt;
mod status;

pub use crate::codec::{XmlCodec, XmlNodeConverter};
pub use crate::descriptor::{OperationDescriptor, OperationKind};
pub use crate::device::{Device, DeviceBuilder, OperationService, ReplyFuture};
pub use crate::extensions::{OperationMethod, SessionId};
pub use crate::identity::{InstanceIdentifier, ListKey, PathArgument};
pub use crate::node::{ContainerNode, DataNode, LeafListNode, LeafNode, ListNode, MapEntryNode, Value};
pub use crate::qname::{ns, InvalidQName, QName};
pub use crate::request::Request;
pub use crate::response::Response;
pub use crate::router::{RegistrationError, Router};
pub use crate::rt::{BoxFuture, Executor, HandleExec, SharedExec, TokioExec};
pub use crate::server::PendingResponse;
pub use crate::status::{ErrorInfo, ErrorSeverity, ErrorTag, ErrorType, Status};
pub use crate::xml::Element;

/// Request and response extensions, re-exported from `http`.
pub use http::Extensions;

#[cfg(feature = "codegen")]
#[cfg_attr(docsrs, doc(cfg(feature = "codegen")))]
pub use async_trait::async_trait;

/// Boxed error type used where a handler or collaborator error is carried
/// opaquely.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
