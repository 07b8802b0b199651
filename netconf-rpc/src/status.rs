use crate::qname::ns;
use crate::xml::Element;
use crate::QName;
use std::{error::Error, fmt, sync::Arc};
use tracing::trace;

/// A NETCONF `<rpc-error>` describing why an operation failed.
///
/// Values can be created using the `new` function or one of the specialized
/// associated functions named after the error tag they carry. Each of those
/// picks the error type RFC 6241 lists first for that tag; use
/// [`Status::with_error_type`] to override it.
/// ```rust
/// # use netconf_rpc::{Status, ErrorTag, ErrorType};
/// let status1 = Status::new(ErrorType::Application, ErrorTag::InvalidValue, "bad date");
/// let status2 = Status::invalid_value("bad date");
///
/// assert_eq!(status1.tag(), ErrorTag::InvalidValue);
/// assert_eq!(status1.error_type(), status2.error_type());
/// ```
#[derive(Clone)]
pub struct Status {
    /// The conceptual layer the error occurred at, `<error-type>`.
    error_type: ErrorType,
    /// The error condition, `<error-tag>`.
    tag: ErrorTag,
    /// `<error-severity>`.
    severity: ErrorSeverity,
    /// A human readable message, `<error-message>`.
    message: String,
    /// Absolute XPath of the offending node, `<error-path>`.
    path: Option<String>,
    /// Tag-specific details, `<error-info>`.
    info: ErrorInfo,
    /// Optional underlying error.
    source: Option<Arc<dyn Error + Send + Sync + 'static>>,
}

/// The `<error-type>` of an `<rpc-error>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Secure transport layer.
    Transport,
    /// Messages layer, e.g. a malformed `<rpc>` envelope.
    Rpc,
    /// Operations layer.
    Protocol,
    /// Content layer.
    Application,
}

/// The `<error-tag>` of an `<rpc-error>`.
///
/// These variants match the tags of RFC 6241, appendix A.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorTag {
    /// The request requires a resource that already is in use.
    InUse,
    /// The request specifies an unacceptable value for one or more
    /// parameters.
    InvalidValue,
    /// The request or response is too large for the implementation to
    /// handle.
    TooBig,
    /// An expected attribute is missing.
    MissingAttribute,
    /// An attribute value is not correct.
    BadAttribute,
    /// An unexpected attribute is present.
    UnknownAttribute,
    /// An expected element is missing.
    MissingElement,
    /// An element value is not correct.
    BadElement,
    /// An unexpected element is present.
    UnknownElement,
    /// An unexpected namespace is present.
    UnknownNamespace,
    /// Access to the requested protocol operation or data model is denied.
    AccessDenied,
    /// Access to the requested lock is denied.
    LockDenied,
    /// Request could not be completed because of insufficient resources.
    ResourceDenied,
    /// Request to roll back some configuration change was not completed.
    RollbackFailed,
    /// The relevant data model content already exists.
    DataExists,
    /// The relevant data model content does not exist.
    DataMissing,
    /// The requested operation is not supported by this implementation.
    OperationNotSupported,
    /// The operation failed for a reason not covered by any other tag.
    OperationFailed,
    /// The message could not be handled because it failed to be parsed
    /// correctly.
    MalformedMessage,
}

/// The `<error-severity>` of an `<rpc-error>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ErrorSeverity {
    /// `error`
    #[default]
    Error,
    /// `warning`
    Warning,
}

/// Structured `<error-info>` content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// `<bad-element>`: the element that caused the error.
    pub bad_element: Option<String>,
    /// `<bad-attribute>`: the attribute that caused the error.
    pub bad_attribute: Option<String>,
    /// `<bad-namespace>`: the namespace that caused the error.
    pub bad_namespace: Option<String>,
    /// `<session-id>`: the session holding a contended resource.
    pub session_id: Option<u32>,
}

impl ErrorInfo {
    /// Returns `true` if no detail is set.
    pub fn is_empty(&self) -> bool {
        self.bad_element.is_none()
            && self.bad_attribute.is_none()
            && self.bad_namespace.is_none()
            && self.session_id.is_none()
    }
}

impl ErrorType {
    /// The wire value of this error type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Transport => "transport",
            ErrorType::Rpc => "rpc",
            ErrorType::Protocol => "protocol",
            ErrorType::Application => "application",
        }
    }

    /// Parse a wire value, `None` if it is not one of the four error types.
    pub fn parse(value: &str) -> Option<ErrorType> {
        match value {
            "transport" => Some(ErrorType::Transport),
            "rpc" => Some(ErrorType::Rpc),
            "protocol" => Some(ErrorType::Protocol),
            "application" => Some(ErrorType::Application),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorTag {
    /// The wire value of this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::InUse => "in-use",
            ErrorTag::InvalidValue => "invalid-value",
            ErrorTag::TooBig => "too-big",
            ErrorTag::MissingAttribute => "missing-attribute",
            ErrorTag::BadAttribute => "bad-attribute",
            ErrorTag::UnknownAttribute => "unknown-attribute",
            ErrorTag::MissingElement => "missing-element",
            ErrorTag::BadElement => "bad-element",
            ErrorTag::UnknownElement => "unknown-element",
            ErrorTag::UnknownNamespace => "unknown-namespace",
            ErrorTag::AccessDenied => "access-denied",
            ErrorTag::LockDenied => "lock-denied",
            ErrorTag::ResourceDenied => "resource-denied",
            ErrorTag::RollbackFailed => "rollback-failed",
            ErrorTag::DataExists => "data-exists",
            ErrorTag::DataMissing => "data-missing",
            ErrorTag::OperationNotSupported => "operation-not-supported",
            ErrorTag::OperationFailed => "operation-failed",
            ErrorTag::MalformedMessage => "malformed-message",
        }
    }

    /// Parse a wire value.
    ///
    /// Unknown tags, including the deprecated `partial-operation`, map to
    /// [`ErrorTag::OperationFailed`].
    pub fn parse(value: &str) -> ErrorTag {
        match value {
            "in-use" => ErrorTag::InUse,
            "invalid-value" => ErrorTag::InvalidValue,
            "too-big" => ErrorTag::TooBig,
            "missing-attribute" => ErrorTag::MissingAttribute,
            "bad-attribute" => ErrorTag::BadAttribute,
            "unknown-attribute" => ErrorTag::UnknownAttribute,
            "missing-element" => ErrorTag::MissingElement,
            "bad-element" => ErrorTag::BadElement,
            "unknown-element" => ErrorTag::UnknownElement,
            "unknown-namespace" => ErrorTag::UnknownNamespace,
            "access-denied" => ErrorTag::AccessDenied,
            "lock-denied" => ErrorTag::LockDenied,
            "resource-denied" => ErrorTag::ResourceDenied,
            "rollback-failed" => ErrorTag::RollbackFailed,
            "data-exists" => ErrorTag::DataExists,
            "data-missing" => ErrorTag::DataMissing,
            "operation-not-supported" => ErrorTag::OperationNotSupported,
            "operation-failed" => ErrorTag::OperationFailed,
            "malformed-message" => ErrorTag::MalformedMessage,
            other => {
                trace!("unknown error-tag {:?}, treating as operation-failed", other);
                ErrorTag::OperationFailed
            }
        }
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorSeverity {
    /// The wire value of this severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Error => "error",
            ErrorSeverity::Warning => "warning",
        }
    }
}

// ===== impl Status =====

impl Status {
    /// Create a new `Status` with the associated error type, tag and message.
    pub fn new(error_type: ErrorType, tag: ErrorTag, message: impl Into<String>) -> Status {
        Status {
            error_type,
            tag,
            severity: ErrorSeverity::Error,
            message: message.into(),
            path: None,
            info: ErrorInfo::default(),
            source: None,
        }
    }

    /// The resource is already in use.
    pub fn in_use(message: impl Into<String>) -> Status {
        Status::new(ErrorType::Protocol, ErrorTag::InUse, message)
    }

    /// A parameter carries an unacceptable value.
    pub fn invalid_value(message: impl Into<String>) -> Status {
        Status::new(ErrorType::Application, ErrorTag::InvalidValue, message)
    }

    /// The request or response is too large.
    pub fn too_big(message: impl Into<String>) -> Status {
        Status::new(ErrorType::Application, ErrorTag::TooBig, message)
    }

    /// An expected attribute is missing from `element`.
    pub fn missing_attribute(element: impl Into<String>, attribute: impl Into<String>) -> Status {
        let element = element.into();
        let attribute = attribute.into();
        let mut status = Status::new(
            ErrorType::Rpc,
            ErrorTag::MissingAttribute,
            format!("missing attribute {} on {}", attribute, element),
        );
        status.info.bad_element = Some(element);
        status.info.bad_attribute = Some(attribute);
        status
    }

    /// An attribute value is not correct.
    pub fn bad_attribute(element: impl Into<String>, attribute: impl Into<String>) -> Status {
        let element = element.into();
        let attribute = attribute.into();
        let mut status = Status::new(
            ErrorType::Rpc,
            ErrorTag::BadAttribute,
            format!("bad attribute {} on {}", attribute, element),
        );
        status.info.bad_element = Some(element);
        status.info.bad_attribute = Some(attribute);
        status
    }

    /// An expected element is missing. `element` names the missing element.
    pub fn missing_element(element: impl Into<String>) -> Status {
        let element = element.into();
        Status::new(
            ErrorType::Application,
            ErrorTag::MissingElement,
            format!("missing element {}", element),
        )
        .with_bad_element(element)
    }

    /// The value of `element` is not correct.
    pub fn bad_element(element: impl Into<String>, message: impl Into<String>) -> Status {
        Status::new(ErrorType::Application, ErrorTag::BadElement, message).with_bad_element(element)
    }

    /// `element` is not allowed at its position.
    pub fn unknown_element(element: impl Into<String>) -> Status {
        let element = element.into();
        Status::new(
            ErrorType::Application,
            ErrorTag::UnknownElement,
            format!("unknown element {}", element),
        )
        .with_bad_element(element)
    }

    /// `namespace` is not known to this device.
    pub fn unknown_namespace(element: impl Into<String>, namespace: impl Into<String>) -> Status {
        let namespace = namespace.into();
        let mut status = Status::new(
            ErrorType::Protocol,
            ErrorTag::UnknownNamespace,
            format!("unknown namespace {}", namespace),
        )
        .with_bad_element(element);
        status.info.bad_namespace = Some(namespace);
        status
    }

    /// Access to the operation or data is denied.
    pub fn access_denied(message: impl Into<String>) -> Status {
        Status::new(ErrorType::Protocol, ErrorTag::AccessDenied, message)
    }

    /// The requested lock is held by another session.
    pub fn lock_denied(session_id: u32) -> Status {
        let mut status = Status::new(
            ErrorType::Protocol,
            ErrorTag::LockDenied,
            "lock is already held",
        );
        status.info.session_id = Some(session_id);
        status
    }

    /// Insufficient resources to complete the request.
    pub fn resource_denied(message: impl Into<String>) -> Status {
        Status::new(ErrorType::Application, ErrorTag::ResourceDenied, message)
    }

    /// A rollback could not be completed.
    pub fn rollback_failed(message: impl Into<String>) -> Status {
        Status::new(ErrorType::Application, ErrorTag::RollbackFailed, message)
    }

    /// The addressed data already exists.
    pub fn data_exists(message: impl Into<String>) -> Status {
        Status::new(ErrorType::Application, ErrorTag::DataExists, message)
    }

    /// The addressed data does not exist.
    pub fn data_missing(message: impl Into<String>) -> Status {
        Status::new(ErrorType::Application, ErrorTag::DataMissing, message)
    }

    /// The operation is not supported by this device.
    pub fn operation_not_supported(message: impl Into<String>) -> Status {
        Status::new(ErrorType::Protocol, ErrorTag::OperationNotSupported, message)
    }

    /// The operation failed for some other reason.
    pub fn operation_failed(message: impl Into<String>) -> Status {
        Status::new(ErrorType::Application, ErrorTag::OperationFailed, message)
    }

    /// The message could not be parsed.
    pub fn malformed_message(message: impl Into<String>) -> Status {
        Status::new(ErrorType::Rpc, ErrorTag::MalformedMessage, message)
    }

    /// Create a `Status` from various types of `Error`.
    ///
    /// Inspects the error source chain for a `Status` and returns it, or else
    /// returns an `operation-failed` `Status` carrying the error as its source.
    pub fn from_error(err: crate::Error) -> Status {
        Status::try_from_error(err).unwrap_or_else(|err| {
            let mut status = Status::operation_failed(err.to_string());
            status.source = Some(err.into());
            status
        })
    }

    /// Create a `Status` from various types of `Error`.
    ///
    /// Returns the error if a status could not be found in its source chain.
    pub fn try_from_error(err: crate::Error) -> Result<Status, crate::Error> {
        let err = match err.downcast::<Status>() {
            Ok(status) => {
                return Ok(*status);
            }
            Err(err) => err,
        };

        if let Some(mut status) = find_status_in_source_chain(&*err) {
            status.source = Some(err.into());
            return Ok(status);
        }

        Err(err)
    }

    /// Parse an `<rpc-error>` element.
    ///
    /// Returns `None` if `element` is not an `<rpc-error>` or lacks the
    /// mandatory `<error-type>`.
    pub fn from_element(element: &Element) -> Option<Status> {
        if !element.name().is(ns::NETCONF_BASE, "rpc-error") {
            return None;
        }

        let text = |name: &str| {
            element
                .child(&QName::new(ns::NETCONF_BASE, name))
                .and_then(Element::text)
        };

        let error_type = ErrorType::parse(text("error-type")?)?;
        let tag = ErrorTag::parse(text("error-tag").unwrap_or_default());
        let mut status = Status::new(error_type, tag, text("error-message").unwrap_or_default());
        if text("error-severity") == Some("warning") {
            status.severity = ErrorSeverity::Warning;
        }
        status.path = text("error-path").map(str::to_owned);

        if let Some(info) = element.child(&QName::new(ns::NETCONF_BASE, "error-info")) {
            let field = |name: &str| {
                info.child(&QName::new(ns::NETCONF_BASE, name))
                    .and_then(Element::text)
                    .map(str::to_owned)
            };
            status.info.bad_element = field("bad-element");
            status.info.bad_attribute = field("bad-attribute");
            status.info.bad_namespace = field("bad-namespace");
            status.info.session_id = field("session-id").and_then(|id| id.parse().ok());
        }

        Some(status)
    }

    /// Render this status as an `<rpc-error>` element.
    pub fn to_element(&self) -> Element {
        let name = |local: &str| QName::new(ns::NETCONF_BASE, local);

        let mut element = Element::new(name("rpc-error"))
            .with_child(Element::new(name("error-type")).with_text(self.error_type.as_str()))
            .with_child(Element::new(name("error-tag")).with_text(self.tag.as_str()))
            .with_child(Element::new(name("error-severity")).with_text(self.severity.as_str()));

        if let Some(path) = &self.path {
            element.push_child(Element::new(name("error-path")).with_text(path.as_str()));
        }

        if !self.message.is_empty() {
            element.push_child(Element::new(name("error-message")).with_text(self.message.as_str()));
        }

        if !self.info.is_empty() {
            let mut info = Element::new(name("error-info"));
            let fields = [
                ("bad-attribute", self.info.bad_attribute.clone()),
                ("bad-element", self.info.bad_element.clone()),
                ("bad-namespace", self.info.bad_namespace.clone()),
                ("session-id", self.info.session_id.map(|id| id.to_string())),
            ];
            for (local, value) in fields {
                if let Some(value) = value {
                    info.push_child(Element::new(name(local)).with_text(value));
                }
            }
            element.push_child(info);
        }

        element
    }

    /// The `<error-type>` of this status.
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// The `<error-tag>` of this status.
    pub fn tag(&self) -> ErrorTag {
        self.tag
    }

    /// The `<error-severity>` of this status.
    pub fn severity(&self) -> ErrorSeverity {
        self.severity
    }

    /// The message of this status.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The `<error-path>` of this status, if any.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// The `<error-info>` of this status.
    pub fn info(&self) -> &ErrorInfo {
        &self.info
    }

    /// Override the error type.
    #[must_use]
    pub fn with_error_type(self, error_type: ErrorType) -> Status {
        Status { error_type, ..self }
    }

    /// Set the severity.
    #[must_use]
    pub fn with_severity(self, severity: ErrorSeverity) -> Status {
        Status { severity, ..self }
    }

    /// Set `<error-path>`.
    #[must_use]
    pub fn with_path(self, path: impl Into<String>) -> Status {
        Status {
            path: Some(path.into()),
            ..self
        }
    }

    /// Set `<bad-element>` in `<error-info>`.
    #[must_use]
    pub fn with_bad_element(mut self, element: impl Into<String>) -> Status {
        self.info.bad_element = Some(element.into());
        self
    }

    /// Add a source error to this status.
    pub fn set_source(&mut self, source: Arc<dyn Error + Send + Sync + 'static>) -> &mut Status {
        self.source = Some(source);
        self
    }
}

fn find_status_in_source_chain(err: &(dyn Error + 'static)) -> Option<Status> {
    let mut source = Some(err);

    while let Some(err) = source {
        if let Some(status) = err.downcast_ref::<Status>() {
            return Some(Status {
                // The original source stays with the original `Status`.
                source: None,
                ..status.clone()
            });
        }

        source = err.source();
    }

    None
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A manual impl to reduce the noise of frequently empty fields.
        let mut builder = f.debug_struct("Status");

        builder.field("error_type", &self.error_type);
        builder.field("tag", &self.tag);

        if self.severity != ErrorSeverity::Error {
            builder.field("severity", &self.severity);
        }

        if !self.message.is_empty() {
            builder.field("message", &self.message);
        }

        if let Some(path) = &self.path {
            builder.field("path", path);
        }

        if !self.info.is_empty() {
            builder.field("info", &self.info);
        }

        builder.field("source", &self.source);

        builder.finish()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error-type: {}, error-tag: {}, message: {:?}",
            self.error_type, self.tag, self.message,
        )
    }
}

impl Error for Status {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|err| (&**err) as _)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[derive(Debug)]
    struct Nested(Error);

    impl fmt::Display for Nested {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "nested error: {}", self.0)
        }
    }

    impl std::error::Error for Nested {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&*self.0)
        }
    }

    #[test]
    fn from_error_status() {
        let orig = Status::data_missing("no such server");
        let found = Status::from_error(Box::new(orig));

        assert_eq!(found.tag(), ErrorTag::DataMissing);
        assert_eq!(found.message(), "no such server");
    }

    #[test]
    fn from_error_unknown() {
        let orig: Error = "peek-a-boo".into();
        let found = Status::from_error(orig);

        assert_eq!(found.tag(), ErrorTag::OperationFailed);
        assert_eq!(found.error_type(), ErrorType::Application);
        assert_eq!(found.message(), "peek-a-boo");
        assert!(std::error::Error::source(&found).is_some());
    }

    #[test]
    fn from_error_nested() {
        let orig = Nested(Box::new(Status::in_use("busy")));
        let found = Status::from_error(Box::new(orig));

        assert_eq!(found.tag(), ErrorTag::InUse);
        assert_eq!(found.message(), "busy");
    }

    #[test]
    fn tag_round_trips_through_wire_value() {
        let tags = [
            ErrorTag::InUse,
            ErrorTag::InvalidValue,
            ErrorTag::TooBig,
            ErrorTag::MissingAttribute,
            ErrorTag::BadAttribute,
            ErrorTag::UnknownAttribute,
            ErrorTag::MissingElement,
            ErrorTag::BadElement,
            ErrorTag::UnknownElement,
            ErrorTag::UnknownNamespace,
            ErrorTag::AccessDenied,
            ErrorTag::LockDenied,
            ErrorTag::ResourceDenied,
            ErrorTag::RollbackFailed,
            ErrorTag::DataExists,
            ErrorTag::DataMissing,
            ErrorTag::OperationNotSupported,
            ErrorTag::OperationFailed,
            ErrorTag::MalformedMessage,
        ];

        for tag in tags {
            assert_eq!(ErrorTag::parse(tag.as_str()), tag);
        }

        assert_eq!(ErrorTag::parse("partial-operation"), ErrorTag::OperationFailed);
    }

    #[test]
    fn constructors() {
        assert_eq!(Status::in_use("").tag(), ErrorTag::InUse);
        assert_eq!(Status::invalid_value("").tag(), ErrorTag::InvalidValue);
        assert_eq!(Status::too_big("").tag(), ErrorTag::TooBig);
        assert_eq!(
            Status::missing_attribute("rpc", "message-id").tag(),
            ErrorTag::MissingAttribute
        );
        assert_eq!(Status::bad_attribute("rpc", "x").tag(), ErrorTag::BadAttribute);
        assert_eq!(Status::missing_element("name").tag(), ErrorTag::MissingElement);
        assert_eq!(Status::bad_element("name", "").tag(), ErrorTag::BadElement);
        assert_eq!(Status::unknown_element("x").tag(), ErrorTag::UnknownElement);
        assert_eq!(
            Status::unknown_namespace("x", "urn:x").tag(),
            ErrorTag::UnknownNamespace
        );
        assert_eq!(Status::access_denied("").tag(), ErrorTag::AccessDenied);
        assert_eq!(Status::lock_denied(3).tag(), ErrorTag::LockDenied);
        assert_eq!(Status::resource_denied("").tag(), ErrorTag::ResourceDenied);
        assert_eq!(Status::rollback_failed("").tag(), ErrorTag::RollbackFailed);
        assert_eq!(Status::data_exists("").tag(), ErrorTag::DataExists);
        assert_eq!(Status::data_missing("").tag(), ErrorTag::DataMissing);
        assert_eq!(
            Status::operation_not_supported("").tag(),
            ErrorTag::OperationNotSupported
        );
        assert_eq!(Status::operation_failed("").tag(), ErrorTag::OperationFailed);
        assert_eq!(Status::malformed_message("").tag(), ErrorTag::MalformedMessage);
        assert_eq!(Status::malformed_message("").error_type(), ErrorType::Rpc);
    }

    #[test]
    fn element_round_trip() {
        let status = Status::missing_element("name")
            .with_error_type(ErrorType::Protocol)
            .with_path("/server");

        let parsed = Status::from_element(&status.to_element()).unwrap();

        assert_eq!(parsed.severity(), ErrorSeverity::Error);
        assert_eq!(parsed.error_type(), ErrorType::Protocol);
        assert_eq!(parsed.tag(), ErrorTag::MissingElement);
        assert_eq!(parsed.message(), status.message());
        assert_eq!(parsed.path(), Some("/server"));
        assert_eq!(parsed.info(), status.info());
    }

    #[test]
    fn warnings_keep_their_severity() {
        let status = Status::operation_failed("fan speed degraded").with_severity(ErrorSeverity::Warning);
        assert_eq!(status.severity(), ErrorSeverity::Warning);

        let element = status.to_element();
        let severity = element
            .child(&QName::new(ns::NETCONF_BASE, "error-severity"))
            .and_then(Element::text);
        assert_eq!(severity, Some("warning"));

        let parsed = Status::from_element(&element).unwrap();
        assert_eq!(parsed.severity(), ErrorSeverity::Warning);
        assert_eq!(parsed.tag(), ErrorTag::OperationFailed);
    }

    #[test]
    fn to_element_skips_empty_fields() {
        let element = Status::operation_failed("").to_element();
        let locals: Vec<_> = element
            .children()
            .iter()
            .map(|child| child.name().local_name())
            .collect();

        assert_eq!(locals, ["error-type", "error-tag", "error-severity"]);
    }
}
