//! Operation handlers and their dispatch.
//!
//! Handlers are plain [`tower_service::Service`]s wrapped in an
//! [`RpcDispatcher`] or [`ActionDispatcher`]. A dispatcher turns one `<rpc>`
//! element into a [`PendingResponse`] that completes once the handler future
//! settles.

mod bridge;
mod dispatch;
mod service;

pub use self::bridge::{invoke, Completion, PendingResponse};
pub use self::dispatch::{ActionDispatcher, Dispatch, DispatchContext, RpcDispatcher};
pub use self::service::{ActionService, RpcService};
