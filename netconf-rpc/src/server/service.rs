use crate::{InstanceIdentifier, Request, Response, Status};
use std::future::Future;
use tower_service::Service;

/// A specialization of tower_service::Service for global RPCs.
///
/// Existing tower_service::Service implementations with the correct form will
/// automatically implement `RpcService`.
pub trait RpcService<R> {
    /// Output type
    type Response;

    /// Response future
    type Future: Future<Output = Result<Response<Self::Response>, Status>>;

    /// Call the service
    fn call(&mut self, request: Request<R>) -> Self::Future;
}

impl<T, M1, M2> RpcService<M1> for T
where
    T: Service<Request<M1>, Response = Response<M2>, Error = Status>,
{
    type Response = M2;
    type Future = T::Future;

    fn call(&mut self, request: Request<M1>) -> Self::Future {
        Service::call(self, request)
    }
}

/// A specialization of tower_service::Service for actions.
///
/// An action handler receives the identifier of the data node the action was
/// invoked on along with the input. Existing tower_service::Service
/// implementations taking `(InstanceIdentifier, Request<R>)` automatically
/// implement `ActionService`.
pub trait ActionService<R> {
    /// Output type
    type Response;

    /// Response future
    type Future: Future<Output = Result<Response<Self::Response>, Status>>;

    /// Call the service
    fn call(&mut self, target: InstanceIdentifier, request: Request<R>) -> Self::Future;
}

impl<T, M1, M2> ActionService<M1> for T
where
    T: Service<(InstanceIdentifier, Request<M1>), Response = Response<M2>, Error = Status>,
{
    type Response = M2;
    type Future = T::Future;

    fn call(&mut self, target: InstanceIdentifier, request: Request<M1>) -> Self::Future {
        Service::call(self, (target, request))
    }
}
