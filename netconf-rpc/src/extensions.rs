use crate::schema::SchemaPath;
use crate::{OperationDescriptor, OperationKind, QName};
use std::fmt;

/// The NETCONF session a request arrived on.
///
/// Inserted into request extensions by [`OperationService`](crate::OperationService).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u32);

impl SessionId {
    /// Wrap a session id assigned by the transport.
    pub fn new(id: u32) -> Self {
        SessionId(id)
    }

    /// The raw session id.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The operation a request invokes.
///
/// Dispatchers insert this into the extensions of every request they hand to
/// a handler.
#[derive(Clone, Debug)]
pub struct OperationMethod {
    descriptor: OperationDescriptor,
}

impl OperationMethod {
    pub(crate) fn new(descriptor: OperationDescriptor) -> Self {
        Self { descriptor }
    }

    /// The operation name.
    pub fn name(&self) -> &QName {
        self.descriptor.name()
    }

    /// RPC or action.
    pub fn kind(&self) -> OperationKind {
        self.descriptor.kind()
    }

    /// The absolute schema path of the operation.
    pub fn path(&self) -> &SchemaPath {
        self.descriptor.path()
    }
}
