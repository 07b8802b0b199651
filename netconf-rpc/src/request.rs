use crate::{Extensions, OperationMethod, SessionId};

/// An operation input together with the extensions of its invocation.
#[derive(Debug)]
pub struct Request<T> {
    message: T,
    extensions: Extensions,
}

impl<T> Request<T> {
    /// Create a new request around `message`.
    ///
    /// ```rust
    /// # use netconf_rpc::Request;
    /// let request = Request::new("reset");
    /// assert_eq!(*request.get_ref(), "reset");
    /// ```
    pub fn new(message: T) -> Self {
        Request {
            message,
            extensions: Extensions::default(),
        }
    }

    /// Get a reference to the message.
    pub fn get_ref(&self) -> &T {
        &self.message
    }

    /// Get a mutable reference to the message.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.message
    }

    /// Consumes `self`, returning the message.
    pub fn into_inner(self) -> T {
        self.message
    }

    /// Consumes `self` returning the parts of the request.
    pub fn into_parts(self) -> (Extensions, T) {
        (self.extensions, self.message)
    }

    /// Create a new request from its parts.
    pub fn from_parts(extensions: Extensions, message: T) -> Self {
        Request {
            message,
            extensions,
        }
    }

    /// Map the message while keeping the extensions.
    pub fn map<F, U>(self, f: F) -> Request<U>
    where
        F: FnOnce(T) -> U,
    {
        Request {
            message: f(self.message),
            extensions: self.extensions,
        }
    }

    /// Returns a reference to the associated extensions.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns a mutable reference to the associated extensions.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// The session the request arrived on, if the transport recorded one.
    pub fn session_id(&self) -> Option<SessionId> {
        self.extensions.get::<SessionId>().copied()
    }

    /// The operation being invoked. Set by the dispatcher.
    pub fn operation(&self) -> Option<&OperationMethod> {
        self.extensions.get::<OperationMethod>()
    }
}
