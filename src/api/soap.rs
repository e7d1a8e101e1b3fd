//! Envelopes and response helpers for the Metadata SOAP API

use quick_xml::escape::escape;
use roxmltree::Document;

use crate::deploy::request::METADATA_NS;
use crate::deploy::result::{child, text};
use crate::deploy::DeployError;

/// Wrap `body` in a SOAP envelope carrying the session header
pub fn envelope(session_id: &str, body: &str) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
            "<env:Envelope xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" ",
            "xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" ",
            "xmlns:env=\"http://schemas.xmlsoap.org/soap/envelope/\" ",
            "xmlns:cmd=\"{ns}\">",
            "<env:Header><cmd:SessionHeader><cmd:sessionId>{session}</cmd:sessionId></cmd:SessionHeader></env:Header>",
            "<env:Body>{body}</env:Body>",
            "</env:Envelope>"
        ),
        ns = METADATA_NS,
        session = escape(session_id),
        body = body
    )
}

/// `<checkDeployStatus>` body for an async deploy id
pub fn check_deploy_status_body(async_id: &str) -> String {
    format!(
        "<checkDeployStatus xmlns=\"{}\"><asyncProcessId>{}</asyncProcessId><includeDetails>true</includeDetails></checkDeployStatus>",
        METADATA_NS,
        escape(async_id)
    )
}

/// The `faultcode: faultstring` of a SOAP fault, if the response is one
pub fn fault(xml: &str) -> Option<String> {
    let doc = Document::parse(xml).ok()?;
    let fault = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Fault")?;
    let code = text(fault, "faultcode");
    let message = text(fault, "faultstring");
    Some(if code.is_empty() {
        message
    } else {
        format!("{}: {}", code, message)
    })
}

/// Async process id from a `deployResponse`
pub fn deploy_id(xml: &str) -> Result<String, DeployError> {
    let doc = Document::parse(xml)
        .map_err(|e| DeployError::transport(format!("Invalid deploy response: {}", e)))?;
    let id = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "deployResponse")
        .and_then(|n| child(n, "result"))
        .map(|n| text(n, "id"))
        .unwrap_or_default();

    if id.is_empty() {
        return Err(DeployError::transport(
            "Deploy response did not contain an async process id",
        ));
    }
    Ok(id)
}
