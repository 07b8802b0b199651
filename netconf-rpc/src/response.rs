use crate::Extensions;

/// An operation output returned by a handler.
#[derive(Debug)]
pub struct Response<T> {
    message: T,
    extensions: Extensions,
}

impl<T> Response<T> {
    /// Create a new response around `message`.
    ///
    /// ```rust
    /// # use netconf_rpc::Response;
    /// let response = Response::new("2020-09-03T16:20:00Z");
    /// assert_eq!(response.into_inner(), "2020-09-03T16:20:00Z");
    /// ```
    pub fn new(message: T) -> Self {
        Response {
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

    /// Consumes `self` returning the parts of the response.
    pub fn into_parts(self) -> (Extensions, T) {
        (self.extensions, self.message)
    }

    /// Map the message while keeping the extensions.
    pub fn map<F, U>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
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
}
