//! `<rpc>` envelope checks and `<rpc-reply>` framing (RFC 6241, section 4).

use crate::xml::{Attribute, Element};
use crate::{ns, QName, Status};

const MESSAGE_ID: &str = "message-id";

/// Ensure `rpc` is a NETCONF `<rpc>` carrying a `message-id`.
pub(crate) fn check_envelope(rpc: &Element) -> Result<(), Status> {
    if !rpc.name().is(ns::NETCONF_BASE, "rpc") {
        return Err(Status::malformed_message(format!(
            "expected <rpc> in {}, found {}",
            ns::NETCONF_BASE,
            rpc.name()
        )));
    }

    if rpc.attribute(&QName::unqualified(MESSAGE_ID)).is_none() {
        return Err(Status::missing_attribute("rpc", MESSAGE_ID));
    }

    Ok(())
}

/// Frame `outcome` as the reply to an `<rpc>` with `attributes`.
///
/// Every attribute of the request is echoed. Empty output is acknowledged
/// with `<ok/>`.
pub(crate) fn rpc_reply(attributes: &[Attribute], outcome: Result<Vec<Element>, Status>) -> Element {
    let reply = attributes.iter().fold(
        Element::new(QName::new(ns::NETCONF_BASE, "rpc-reply")),
        |reply, attribute| reply.with_attribute(attribute.name().clone(), attribute.value()),
    );

    match outcome {
        Ok(output) if output.is_empty() => {
            reply.with_child(Element::new(QName::new(ns::NETCONF_BASE, "ok")))
        }
        Ok(output) => reply.with_children(output),
        Err(status) => reply.with_child(status.to_element()),
    }
}
