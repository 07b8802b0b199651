use crate::codec::{EncodeBuf, Encoder};
use crate::rt::{Executor, SharedExec};
use crate::schema::SchemaPath;
use crate::xml::Element;
use crate::{Response, Status};
use pin_project::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::sync::oneshot;
use tracing::{debug, trace};

type Outcome = Result<Vec<Element>, Status>;

/// The eventual result of one dispatched operation.
///
/// Resolves to the serialized output, the children of `<rpc-reply>`, or to
/// the `<rpc-error>` the operation failed with. A `PendingResponse` always
/// resolves: if the side responsible for completing it goes away first, it
/// resolves to `operation-failed`.
#[pin_project]
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct PendingResponse {
    #[pin]
    rx: oneshot::Receiver<Outcome>,
}

/// The completing side of a [`PendingResponse`].
///
/// `complete` consumes the completion, so a response is completed at most
/// once. Dropping it without completing resolves the response with
/// `operation-failed`.
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<Outcome>,
}

impl PendingResponse {
    /// Create a pending response and the completion that resolves it.
    pub fn channel() -> (Completion, PendingResponse) {
        let (tx, rx) = oneshot::channel();
        (Completion { tx }, PendingResponse { rx })
    }

    /// A response that is already resolved.
    pub fn ready(outcome: Result<Vec<Element>, Status>) -> PendingResponse {
        let (completion, pending) = PendingResponse::channel();
        completion.complete(outcome);
        pending
    }
}

impl Future for PendingResponse {
    type Output = Result<Vec<Element>, Status>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match ready!(self.project().rx.poll(cx)) {
            Ok(outcome) => Poll::Ready(outcome),
            Err(_) => Poll::Ready(Err(Status::operation_failed(
                "operation ended without producing a result",
            ))),
        }
    }
}

impl Completion {
    /// Resolve the pending response.
    pub fn complete(self, outcome: Result<Vec<Element>, Status>) {
        if self.tx.send(outcome).is_err() {
            debug!("pending response dropped before completion");
        }
    }

    /// Returns `true` if the pending response was dropped.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Observe `future` on `executor` and complete the returned response with its
/// encoded output or its failure.
///
/// Returns without waiting for `future`. Output is encoded with `encoder`
/// against the structure at `output_path`.
pub fn invoke<F, M, E>(
    executor: &SharedExec,
    future: F,
    mut encoder: E,
    output_path: SchemaPath,
) -> PendingResponse
where
    F: Future<Output = Result<Response<M>, Status>> + Send + 'static,
    M: Send + 'static,
    E: Encoder<Item = M, Error = Status> + Send + 'static,
{
    let (completion, pending) = PendingResponse::channel();

    executor.execute(async move {
        let outcome = match future.await {
            Ok(response) => {
                let mut elements = Vec::new();
                let mut buf = EncodeBuf::new(&mut elements, &output_path);
                encoder
                    .encode(response.into_inner(), &mut buf)
                    .map(|()| elements)
            }
            Err(status) => {
                debug!("handler failed at {}: {}", output_path.parent(), status);
                Err(status)
            }
        };

        trace!("completing response for {}", output_path.parent());
        completion.complete(outcome);
    });

    pending
}
