//! Per-session notification delivery.
//!
//! A [`NotificationPublisher`] is either unbound or bound to exactly one
//! session. Binding happens when the transport establishes a session and asks
//! for its operation service; the binding lasts until the returned
//! [`BindingHandle`] is dropped or handed back through
//! [`NotificationPublisher::on_session_closed`].
//!
//! Delivery is best effort. Publishing while unbound, or to a session whose
//! stream has gone away, drops the notification. Nothing is queued.

use crate::codec::IntoNode;
use crate::xml::Element;
use crate::{ns, QName, SessionId};
use arc_swap::ArcSwapOption;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::{debug, trace};

#[derive(Debug)]
struct NotificationChannel {
    session: SessionId,
    tx: mpsc::UnboundedSender<Element>,
}

/// Publishes device notifications onto the currently bound session.
///
/// Clones share the same binding.
#[derive(Clone, Debug, Default)]
pub struct NotificationPublisher {
    slot: Arc<ArcSwapOption<NotificationChannel>>,
}

impl NotificationPublisher {
    /// An unbound publisher.
    pub fn new() -> Self {
        NotificationPublisher::default()
    }

    /// Publish `notification` under the name `identifier`.
    ///
    /// A no-op while unbound. Never fails.
    pub fn publish<N: IntoNode>(&self, notification: N, identifier: QName) {
        let guard = self.slot.load();
        let channel = match &*guard {
            Some(channel) => channel,
            None => {
                trace!("no session bound, dropping notification {}", identifier);
                return;
            }
        };

        let event_time = match OffsetDateTime::now_utc().format(&Rfc3339) {
            Ok(event_time) => event_time,
            Err(err) => {
                debug!("dropping notification {}: {}", identifier, err);
                return;
            }
        };

        let body = notification.into_node(identifier).to_element();
        let name = body.name().clone();
        let notification = Element::new(QName::new(ns::NOTIFICATION, "notification"))
            .with_child(Element::new(QName::new(ns::NOTIFICATION, "eventTime")).with_text(event_time))
            .with_child(body);

        if channel.tx.send(notification).is_err() {
            debug!(
                "session {} stopped listening, dropping notification {}",
                channel.session, name
            );
        }
    }

    /// Bind to a newly established session.
    ///
    /// Replaces any previous binding. Notifications for `session` arrive on
    /// the returned stream for as long as the handle is kept.
    pub fn on_session_established(&self, session: SessionId) -> (BindingHandle, NotificationStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        let channel = Arc::new(NotificationChannel { session, tx });

        if let Some(previous) = self.slot.swap(Some(channel.clone())) {
            debug!("session {} replaces session {} for notifications", session, previous.session);
        } else {
            trace!("session {} bound for notifications", session);
        }

        let handle = BindingHandle {
            slot: self.slot.clone(),
            channel,
        };
        (handle, NotificationStream(UnboundedReceiverStream::new(rx)))
    }

    /// Unbind the session `handle` was issued for, if it is still bound.
    pub fn on_session_closed(&self, handle: BindingHandle) {
        drop(handle);
    }

    /// Returns `true` if a session is bound.
    pub fn is_bound(&self) -> bool {
        self.slot.load().is_some()
    }

    /// The bound session.
    pub fn bound_session(&self) -> Option<SessionId> {
        let guard = self.slot.load();
        (*guard).as_ref().map(|channel| channel.session)
    }

    /// Drop the current binding, whichever session holds it.
    pub fn unbind(&self) {
        if let Some(channel) = self.slot.swap(None) {
            trace!("session {} unbound for notifications", channel.session);
        }
    }
}

/// Keeps a session bound to a [`NotificationPublisher`].
///
/// Dropping the handle unbinds its session unless a newer session has taken
/// over the binding in the meantime.
pub struct BindingHandle {
    slot: Arc<ArcSwapOption<NotificationChannel>>,
    channel: Arc<NotificationChannel>,
}

impl BindingHandle {
    /// The session this handle binds.
    pub fn session(&self) -> SessionId {
        self.channel.session
    }
}

impl Drop for BindingHandle {
    fn drop(&mut self) {
        let current = Some(self.channel.clone());
        let previous = self.slot.compare_and_swap(&current, None::<Arc<NotificationChannel>>);

        let unbound = match &*previous {
            Some(previous) => Arc::ptr_eq(previous, &self.channel),
            None => false,
        };
        if unbound {
            trace!("session {} unbound for notifications", self.channel.session);
        }
    }
}

impl fmt::Debug for BindingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingHandle")
            .field("session", &self.channel.session)
            .finish()
    }
}

/// The notifications delivered to one session, as `<notification>` elements.
///
/// Ends once the session's binding is gone.
pub struct NotificationStream(UnboundedReceiverStream<Element>);

impl Stream for NotificationStream {
    type Item = Element;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.0).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl fmt::Debug for NotificationStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NotificationStream").finish()
    }
}
