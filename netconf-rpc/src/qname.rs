use std::{error::Error, fmt, str::FromStr, sync::Arc};

/// Well-known XML namespaces.
pub mod ns {
    /// NETCONF base protocol namespace (RFC 6241).
    pub const NETCONF_BASE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

    /// Namespace of the YANG 1.1 `<action>` element (RFC 7950, section 7.15.2).
    pub const YANG_1: &str = "urn:ietf:params:xml:ns:yang:1";

    /// NETCONF event notification namespace (RFC 5277).
    pub const NOTIFICATION: &str = "urn:ietf:params:xml:ns:netconf:notification:1.0";

    /// Namespace bound to the reserved `xml` prefix, as in `xml:lang`.
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
}

/// A namespace-qualified name of an XML element or schema node.
///
/// `QName`s are cheap to clone. The textual form is Clark notation,
/// `{namespace}local-name`, which is also what [`FromStr`] accepts.
///
/// ```rust
/// # use netconf_rpc::QName;
/// let name: QName = "{urn:example:data-center}server".parse().unwrap();
///
/// assert_eq!(name.namespace(), "urn:example:data-center");
/// assert_eq!(name.local_name(), "server");
/// assert_eq!(name, QName::new("urn:example:data-center", "server"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    namespace: Arc<str>,
    local_name: Arc<str>,
}

impl QName {
    /// Create a name in the given namespace.
    pub fn new(namespace: impl Into<Arc<str>>, local_name: impl Into<Arc<str>>) -> Self {
        QName {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    /// Create a name that belongs to no namespace.
    pub fn unqualified(local_name: impl Into<Arc<str>>) -> Self {
        QName::new("", local_name)
    }

    /// A sibling name in the same namespace.
    pub fn with_local_name(&self, local_name: impl Into<Arc<str>>) -> Self {
        QName {
            namespace: self.namespace.clone(),
            local_name: local_name.into(),
        }
    }

    /// The namespace URI, empty for unqualified names.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The local part of the name.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Whether this name is `local_name` in namespace `namespace`.
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        &*self.namespace == namespace && &*self.local_name == local_name
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local_name)
        }
    }
}

impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for QName {
    type Err = InvalidQName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, local_name) = match s.strip_prefix('{') {
            Some(rest) => rest.split_once('}').ok_or_else(InvalidQName::new)?,
            None => ("", s),
        };

        if local_name.is_empty() || local_name.contains(['{', '}', ':', ' ']) {
            return Err(InvalidQName::new());
        }

        Ok(QName::new(namespace, local_name))
    }
}

/// A possible error when parsing a [`QName`] from Clark notation.
#[derive(Debug)]
pub struct InvalidQName {
    _priv: (),
}

impl InvalidQName {
    fn new() -> Self {
        InvalidQName { _priv: () }
    }
}

impl fmt::Display for InvalidQName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid qualified name")
    }
}

impl Error for InvalidQName {}
