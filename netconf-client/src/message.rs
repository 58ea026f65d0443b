//! Typed catalog of NETCONF messages: the hello exchange, the `<rpc>`
//! envelope, the standard operations of RFC 6241 and its companions, and
//! the reply/notification documents coming back from the server.
//!
//! Operations serialize through quick-xml's serde support. Payloads that
//! embed caller-supplied XML (subtree filters, `<config>` bodies, actions)
//! are serialized as text and the rendered document unescaped as a whole,
//! so the fragment reaches the wire verbatim.

use crate::error::{Error, Result};
use crate::{
    NS_EVENT_NOTIFICATIONS, NS_MONITORING, NS_NETCONF, NS_NOTIFICATION, NS_TAILF_ACTIONS,
    NS_WITH_DEFAULTS, NS_YANG, NS_YANG_PUSH,
};
use core::fmt;
use core::fmt::Display;
use core::str::FromStr;
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::se::Serializer;
use quick_xml::Reader;
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// `<hello>` message, sent by both peers to open a session.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename(serialize = "hello"))]
pub struct Hello {
    #[serde(rename = "@xmlns")]
    xmlns: String,
    capabilities: Capabilities,
    #[serde(rename = "session-id", skip_serializing_if = "Option::is_none")]
    session_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct Capabilities {
    capability: Vec<String>,
}

impl Hello {
    /// Client hello advertising both base protocol versions.
    pub fn new() -> Hello {
        Hello {
            xmlns: NS_NETCONF.to_string(),
            session_id: None,
            capabilities: Capabilities {
                capability: vec![
                    crate::CAP_BASE_10.to_string(),
                    crate::CAP_BASE_11.to_string(),
                ],
            },
        }
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities
            .capability
            .iter()
            .any(|cap| cap == capability)
    }

    /// Advertised capabilities as a URI -> parameter-string map, splitting
    /// each entry on the first `?`.
    pub fn capability_map(&self) -> HashMap<String, String> {
        self.capabilities
            .capability
            .iter()
            .map(|cap| match cap.split_once('?') {
                Some((uri, params)) => (uri.to_string(), params.to_string()),
                None => (cap.clone(), String::new()),
            })
            .collect()
    }

    pub fn session_id(&self) -> Option<u64> {
        self.session_id
    }

    pub fn to_xml(&self) -> Result<String> {
        use serde::Serialize;
        let mut buffer = String::with_capacity(206);
        let ser = Serializer::new(&mut buffer);
        self.serialize(ser)?;
        Ok(buffer)
    }
}

/// An XML-encodable NETCONF operation, the child element of `<rpc>`.
///
/// Every catalog type implements this; callers can implement it for their
/// own serde types to issue vendor operations through the same session.
pub trait Operation: serde::Serialize {
    /// True when the payload embeds caller-supplied XML that must reach
    /// the wire verbatim.
    fn raw_body(&self) -> bool {
        false
    }
}

/// `<rpc>` envelope pairing a message-id with one operation.
#[derive(Debug, Serialize)]
pub struct Rpc<'a, O: serde::Serialize> {
    #[serde(rename = "@message-id")]
    message_id: u64,
    #[serde(rename = "@xmlns")]
    xmlns: &'a str,
    #[serde(rename = "$value")]
    operation: &'a O,
}

impl<'a, O: Operation> Rpc<'a, O> {
    pub fn new(message_id: u64, operation: &'a O) -> Rpc<'a, O> {
        Rpc {
            message_id,
            xmlns: NS_NETCONF,
            operation,
        }
    }

    /// Renders the full `<rpc>` document.
    pub fn to_xml(&self) -> Result<String> {
        use serde::Serialize;
        let mut buffer = String::with_capacity(256);
        let mut ser = Serializer::with_root(&mut buffer, Some("rpc"))?;
        ser.indent(' ', 2);
        self.serialize(ser)?;
        if self.operation.raw_body() {
            unescape_xml(&buffer)
        } else {
            Ok(buffer)
        }
    }
}

/// `<rpc-reply>` decoded for its outcome only; any `<data>` payload is
/// accessed through [`ReplyData`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RpcReply {
    #[serde(rename = "@message-id")]
    message_id: Option<String>,
    rpc_error: Option<Vec<RpcError>>,
    ok: Option<()>,
}

impl RpcReply {
    pub fn is_ok(&self) -> bool {
        self.rpc_error.is_none()
    }

    pub fn errors(&self) -> &[RpcError] {
        self.rpc_error.as_deref().unwrap_or_default()
    }

    pub fn into_first_error(self) -> Option<RpcError> {
        self.rpc_error
            .and_then(|mut errors| match errors.is_empty() {
                true => None,
                false => Some(errors.remove(0)),
            })
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }
}

/// One `<rpc-error>` element of a reply.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RpcError {
    pub error_type: ErrorType,
    pub error_tag: ErrorTag,
    pub error_severity: ErrorSeverity,
    pub error_app_tag: Option<String>,
    pub error_path: Option<String>,
    pub error_message: Option<String>,
    pub error_info: Option<ErrorInfo>,
}

impl Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.error_tag.as_str(),
            self.error_message.as_deref().unwrap_or("(no error-message)")
        )
    }
}

impl std::error::Error for RpcError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorType {
    Transport,
    Rpc,
    Protocol,
    #[serde(alias = "app")]
    Application,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorTag {
    InUse,
    InvalidValue,
    TooBig,
    MissingAttribute,
    BadAttribute,
    UnknownAttribute,
    MissingElement,
    BadElement,
    UnknownElement,
    UnknownNamespace,
    AccessDenied,
    LockDenied,
    ResourceDenied,
    RollbackFailed,
    DataExists,
    DataMissing,
    OperationNotSupported,
    OperationFailed,
    PartialOperation,
    MalformedMessage,
}

impl ErrorTag {
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
            ErrorTag::PartialOperation => "partial-operation",
            ErrorTag::MalformedMessage => "malformed-message",
        }
    }
}

/// Recognized children of `<error-info>`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ErrorInfo {
    pub bad_element: Option<String>,
    pub bad_attribute: Option<String>,
    pub bad_namespace: Option<String>,
    pub session_id: Option<u64>,
}

/// `<rpc-reply>` whose `<data>` child is exposed as raw XML.
#[derive(Debug)]
pub struct ReplyData {
    pub data: String,
}

impl FromStr for ReplyData {
    type Err = Error;

    fn from_str(doc: &str) -> Result<ReplyData> {
        inner_xml(doc, "data")
            .map(|data| ReplyData { data })
            .ok_or_else(|| Error::new("rpc-reply carries no <data> element".to_string()))
    }
}

/// Server-initiated `<notification>`: the RFC 3339 event time plus the
/// event payload as raw XML.
#[derive(Debug)]
pub struct Notification {
    pub event_time: OffsetDateTime,
    pub content: String,
}

impl Notification {
    /// Inner XML of a YANG-Push `push-update` datastore snapshot, when
    /// this notification carries one.
    pub fn push_update(&self) -> Option<String> {
        inner_xml(&self.content, "datastore-contents-xml")
    }
}

impl FromStr for Notification {
    type Err = Error;

    fn from_str(doc: &str) -> Result<Notification> {
        let mut reader = Reader::from_str(doc);
        let root = loop {
            match reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"notification" => {
                    break e.name().as_ref().to_vec();
                }
                Event::Eof => {
                    return Err(Error::new("message is not a <notification>".to_string()))
                }
                _ => {}
            }
        };
        let event_time = loop {
            match reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"eventTime" => {
                    let name = e.name().as_ref().to_vec();
                    let text = reader.read_text(QName(&name))?;
                    let text = text.decode().map_err(quick_xml::Error::from)?;
                    break OffsetDateTime::parse(text.trim(), &Rfc3339)
                        .map_err(|err| Error::new(format!("invalid eventTime: {err}")))?;
                }
                Event::Eof => {
                    return Err(Error::new("notification carries no eventTime".to_string()))
                }
                _ => {}
            }
        };
        let content = reader
            .read_text(QName(&root))?
            .decode()
            .map_err(quick_xml::Error::from)?
            .trim()
            .to_string();
        Ok(Notification {
            event_time,
            content,
        })
    }
}

/// Local name of the document's root element.
pub(crate) fn root_element(doc: &str) -> Option<String> {
    let mut reader = Reader::from_str(doc);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return String::from_utf8(e.local_name().as_ref().to_vec()).ok();
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

/// Raw inner XML of the first `element` (matched by local name) in `doc`.
pub(crate) fn inner_xml(doc: &str, element: &str) -> Option<String> {
    let mut reader = Reader::from_str(doc);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == element.as_bytes() => {
                let name = e.name().as_ref().to_vec();
                return reader
                    .read_text(QName(&name))
                    .ok()
                    .and_then(|text| text.decode().ok())
                    .map(|text| text.trim().to_string());
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == element.as_bytes() => {
                return Some(String::new());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

pub(crate) fn unescape_xml(raw: &str) -> Result<String> {
    let text = unescape(raw).map_err(quick_xml::Error::from)?;
    Ok(text.into_owned())
}

/// A configuration datastore reference. Strings containing a colon are
/// URLs and encode as `<url>`; the named stores encode as an empty element
/// carrying the store's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Datastore {
    Running,
    Candidate,
    Startup,
    Intended,
    Url(String),
}

const DATASTORES: &[&str] = &["running", "candidate", "startup", "intended", "<scheme>:<url>"];

impl FromStr for Datastore {
    type Err = Error;

    fn from_str(s: &str) -> Result<Datastore> {
        let datastore = s.trim();
        if datastore.contains(':') {
            return Ok(Datastore::Url(datastore.to_string()));
        }
        match datastore.to_lowercase().as_str() {
            "running" => Ok(Datastore::Running),
            "candidate" => Ok(Datastore::Candidate),
            "startup" => Ok(Datastore::Startup),
            "intended" => Ok(Datastore::Intended),
            _ => Err(Error::UnknownDatastore {
                expected: DATASTORES,
                unknown: datastore.to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Source {
    #[serde(rename = "$value")]
    pub datastore: Datastore,
}

#[derive(Debug, Serialize)]
pub struct Target {
    #[serde(rename = "$value")]
    pub datastore: Datastore,
}

/// `<filter>` for `get`, `get-config` and subscriptions: a subtree body,
/// or an xpath select expression.
#[derive(Debug, Serialize)]
pub struct Filter {
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    filter_type: Option<&'static str>,
    #[serde(rename = "@select", skip_serializing_if = "Option::is_none")]
    select: Option<String>,
    #[serde(rename = "$value", skip_serializing_if = "Option::is_none")]
    body: Option<String>,
}

impl Filter {
    /// Subtree filter carrying a literal XML fragment.
    pub fn subtree(body: &str) -> Filter {
        Filter {
            filter_type: Some("subtree"),
            select: None,
            body: Some(body.trim().to_string()),
        }
    }

    /// XPath filter selecting with the given expression.
    pub fn xpath(select: &str) -> Filter {
        Filter {
            filter_type: Some("xpath"),
            select: Some(select.to_string()),
            body: None,
        }
    }

    fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct WithDefaults {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "$text")]
    value: WithDefaultsValue,
}

impl From<WithDefaultsValue> for WithDefaults {
    fn from(value: WithDefaultsValue) -> WithDefaults {
        WithDefaults {
            xmlns: NS_WITH_DEFAULTS,
            value,
        }
    }
}

/// RFC 6243 defaults handling mode.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WithDefaultsValue {
    ReportAll,
    ReportAllTagged,
    Trim,
    Explicit,
}

impl FromStr for WithDefaultsValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<WithDefaultsValue> {
        match s.to_lowercase().as_str() {
            "report-all" => Ok(WithDefaultsValue::ReportAll),
            "report-all-tagged" => Ok(WithDefaultsValue::ReportAllTagged),
            "trim" => Ok(WithDefaultsValue::Trim),
            "explicit" => Ok(WithDefaultsValue::Explicit),
            _ => Err(Error::new(format!("unknown with-defaults value: {}", s))),
        }
    }
}

/// `<edit-config>` default operation applied to config nodes.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultOperation {
    Merge,
    Replace,
    None,
}

impl FromStr for DefaultOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<DefaultOperation> {
        match s.to_lowercase().as_str() {
            "merge" => Ok(DefaultOperation::Merge),
            "replace" => Ok(DefaultOperation::Replace),
            "none" => Ok(DefaultOperation::None),
            _ => Err(Error::new(format!("unknown default-operation: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestOption {
    TestThenSet,
    Set,
    TestOnly,
}

impl FromStr for TestOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<TestOption> {
        match s.to_lowercase().as_str() {
            "test-then-set" => Ok(TestOption::TestThenSet),
            "set" => Ok(TestOption::Set),
            "test-only" => Ok(TestOption::TestOnly),
            _ => Err(Error::new(format!("unknown test-option: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorOption {
    StopOnError,
    ContinueOnError,
    RollbackOnError,
}

impl FromStr for ErrorOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<ErrorOption> {
        match s.to_lowercase().as_str() {
            "stop-on-error" => Ok(ErrorOption::StopOnError),
            "continue-on-error" => Ok(ErrorOption::ContinueOnError),
            "rollback-on-error" => Ok(ErrorOption::RollbackOnError),
            _ => Err(Error::new(format!("unknown error-option: {}", s))),
        }
    }
}

/// Caller-supplied XML fragment carried as element content.
#[derive(Debug, Serialize)]
struct InnerXml {
    #[serde(rename = "$value")]
    xml: String,
}

impl InnerXml {
    fn new(xml: &str) -> InnerXml {
        InnerXml {
            xml: xml.trim().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "get", rename_all = "kebab-case")]
pub struct Get {
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    with_defaults: Option<WithDefaults>,
}

impl Get {
    pub fn new(filter: Option<Filter>, defaults: Option<WithDefaultsValue>) -> Get {
        Get {
            filter,
            with_defaults: defaults.map(WithDefaults::from),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "get-config", rename_all = "kebab-case")]
pub struct GetConfig {
    source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    with_defaults: Option<WithDefaults>,
}

impl GetConfig {
    pub fn new(
        source: Datastore,
        filter: Option<Filter>,
        defaults: Option<WithDefaultsValue>,
    ) -> GetConfig {
        GetConfig {
            source: Source { datastore: source },
            filter,
            with_defaults: defaults.map(WithDefaults::from),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "edit-config", rename_all = "kebab-case")]
pub struct EditConfig {
    target: Target,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_operation: Option<DefaultOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_option: Option<TestOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_option: Option<ErrorOption>,
    config: InnerXml,
}

impl EditConfig {
    pub fn new(
        target: Datastore,
        config: &str,
        default_operation: Option<DefaultOperation>,
        test_option: Option<TestOption>,
        error_option: Option<ErrorOption>,
    ) -> EditConfig {
        EditConfig {
            target: Target { datastore: target },
            default_operation,
            test_option,
            error_option,
            config: InnerXml::new(config),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "copy-config")]
pub struct CopyConfig {
    target: Target,
    source: Source,
}

impl CopyConfig {
    pub fn new(target: Datastore, source: Datastore) -> CopyConfig {
        CopyConfig {
            target: Target { datastore: target },
            source: Source { datastore: source },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "delete-config")]
pub struct DeleteConfig {
    target: Target,
}

impl DeleteConfig {
    pub fn new(target: Datastore) -> DeleteConfig {
        DeleteConfig {
            target: Target { datastore: target },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "lock")]
pub struct Lock {
    target: Target,
}

impl Lock {
    pub fn new(target: Datastore) -> Lock {
        Lock {
            target: Target { datastore: target },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "unlock")]
pub struct Unlock {
    target: Target,
}

impl Unlock {
    pub fn new(target: Datastore) -> Unlock {
        Unlock {
            target: Target { datastore: target },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "kill-session")]
pub struct KillSession {
    #[serde(rename = "session-id")]
    session_id: u64,
}

impl KillSession {
    pub fn new(session_id: u64) -> KillSession {
        KillSession { session_id }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "commit", rename_all = "kebab-case")]
pub struct Commit {
    #[serde(skip_serializing_if = "Option::is_none")]
    confirmed: Option<()>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confirm_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    persist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    persist_id: Option<String>,
}

impl Commit {
    pub fn new() -> Commit {
        Commit {
            confirmed: None,
            confirm_timeout: None,
            persist: None,
            persist_id: None,
        }
    }

    /// Confirmed commit that rolls back unless confirmed within the
    /// timeout (seconds, server default 600).
    pub fn confirmed(
        confirm_timeout: Option<u32>,
        persist: Option<String>,
        persist_id: Option<String>,
    ) -> Commit {
        Commit {
            confirmed: Some(()),
            confirm_timeout,
            persist,
            persist_id,
        }
    }
}

impl Default for Commit {
    fn default() -> Commit {
        Commit::new()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "cancel-commit", rename_all = "kebab-case")]
pub struct CancelCommit {
    #[serde(skip_serializing_if = "Option::is_none")]
    persist_id: Option<String>,
}

impl CancelCommit {
    pub fn new(persist_id: Option<String>) -> CancelCommit {
        CancelCommit { persist_id }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "discard-changes")]
pub struct DiscardChanges;

#[derive(Debug, Serialize)]
#[serde(rename = "close-session")]
pub struct CloseSession;

#[derive(Debug, Serialize)]
#[serde(rename = "validate")]
pub struct Validate {
    source: Source,
}

impl Validate {
    pub fn new(source: Datastore) -> Validate {
        Validate {
            source: Source { datastore: source },
        }
    }
}

/// `<validate>` over an explicit `<config>` body instead of a datastore.
#[derive(Debug, Serialize)]
#[serde(rename = "validate")]
pub struct ValidateConfig {
    source: ValidateSource,
}

#[derive(Debug, Serialize)]
struct ValidateSource {
    config: InnerXml,
}

impl ValidateConfig {
    pub fn new(config: &str) -> ValidateConfig {
        ValidateConfig {
            source: ValidateSource {
                config: InnerXml::new(config),
            },
        }
    }
}

/// RFC 6022 `<get-schema>` retrieving a schema from the server.
#[derive(Debug, Serialize)]
#[serde(rename = "get-schema")]
pub struct GetSchema {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
}

impl GetSchema {
    pub fn new(identifier: &str, version: Option<&str>, format: Option<&str>) -> GetSchema {
        GetSchema {
            xmlns: NS_MONITORING,
            identifier: identifier.to_string(),
            version: version.map(str::to_string),
            format: format.map(str::to_string),
        }
    }
}

/// RFC 5277 `<create-subscription>` starting an event notification stream.
#[derive(Debug, Serialize)]
pub struct CreateSubscription {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    #[serde(
        rename = "startTime",
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    start_time: Option<OffsetDateTime>,
    #[serde(
        rename = "stopTime",
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    stop_time: Option<OffsetDateTime>,
}

impl CreateSubscription {
    pub fn new(
        stream: Option<&str>,
        filter: Option<Filter>,
        start_time: Option<OffsetDateTime>,
        stop_time: Option<OffsetDateTime>,
    ) -> CreateSubscription {
        CreateSubscription {
            xmlns: NS_NOTIFICATION,
            stream: stream.map(str::to_string),
            filter,
            start_time,
            stop_time,
        }
    }
}

/// YANG-Push `<establish-subscription>` for periodic datastore streaming.
#[derive(Debug, Serialize)]
#[serde(rename = "establish-subscription")]
pub struct EstablishSubscription {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "@xmlns:yp")]
    xmlns_yp: &'static str,
    stream: String,
    #[serde(rename = "yp:xpath-filter")]
    xpath_filter: String,
    #[serde(rename = "yp:period")]
    period: u32,
}

impl EstablishSubscription {
    /// Periodic subscription on the yang-push stream; `period` is in
    /// centiseconds.
    pub fn periodic(xpath_filter: &str, period: u32) -> EstablishSubscription {
        EstablishSubscription {
            xmlns: NS_EVENT_NOTIFICATIONS,
            xmlns_yp: NS_YANG_PUSH,
            stream: "yp:yang-push".to_string(),
            xpath_filter: xpath_filter.to_string(),
            period,
        }
    }
}

/// YANG 1.1 `<action>` invocation; the body is the data-node path down to
/// the action and its input parameters.
#[derive(Debug, Serialize)]
#[serde(rename = "action")]
pub struct Action {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "$value")]
    body: String,
}

impl Action {
    pub fn new(body: &str) -> Action {
        Action {
            xmlns: NS_YANG,
            body: body.trim().to_string(),
        }
    }
}

/// Tail-f `<action>` extension wrapping the invocation in `<data>`.
#[derive(Debug, Serialize)]
#[serde(rename = "action")]
pub struct TailfAction {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    data: InnerXml,
}

impl TailfAction {
    pub fn new(data: &str) -> TailfAction {
        TailfAction {
            xmlns: NS_TAILF_ACTIONS,
            data: InnerXml::new(data),
        }
    }
}

impl Operation for Get {
    fn raw_body(&self) -> bool {
        self.filter.as_ref().is_some_and(Filter::has_body)
    }
}

impl Operation for GetConfig {
    fn raw_body(&self) -> bool {
        self.filter.as_ref().is_some_and(Filter::has_body)
    }
}

impl Operation for EditConfig {
    fn raw_body(&self) -> bool {
        true
    }
}

impl Operation for ValidateConfig {
    fn raw_body(&self) -> bool {
        true
    }
}

impl Operation for Action {
    fn raw_body(&self) -> bool {
        true
    }
}

impl Operation for TailfAction {
    fn raw_body(&self) -> bool {
        true
    }
}

impl Operation for CreateSubscription {
    fn raw_body(&self) -> bool {
        self.filter.as_ref().is_some_and(Filter::has_body)
    }
}

impl Operation for CopyConfig {}
impl Operation for DeleteConfig {}
impl Operation for Lock {}
impl Operation for Unlock {}
impl Operation for KillSession {}
impl Operation for Commit {}
impl Operation for CancelCommit {}
impl Operation for DiscardChanges {}
impl Operation for CloseSession {}
impl Operation for Validate {}
impl Operation for GetSchema {}
impl Operation for EstablishSubscription {}
