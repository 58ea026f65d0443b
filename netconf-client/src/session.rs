//! NETCONF session: hello exchange, RPC dispatch and notification receipt
//! over one exclusive transport.
//!
//! A session is single-in-flight: one outbound and one inbound message at
//! a time, with replies arriving in issue order per the NETCONF wire
//! guarantee. Notifications may interleave between replies but never split
//! one; the call path skips them and [`Session::notification`] consumes
//! them. Callers sharing a session across tasks must serialize access
//! externally.

use crate::error::{Error, Result};
use crate::framer::{Codec, FrameReader, FrameWriter};
use crate::message::{
    inner_xml, root_element, unescape_xml, CancelCommit, CloseSession, Commit, CopyConfig,
    CreateSubscription, Datastore, DefaultOperation, DeleteConfig, DiscardChanges, EditConfig,
    ErrorOption, EstablishSubscription, Filter, Get, GetConfig, GetSchema, Hello, KillSession,
    Lock, Notification, Operation, Rpc, RpcReply, TestOption, Unlock, Validate, ValidateConfig,
    WithDefaultsValue,
};
use crate::transport::Transport;
use crate::{CAP_BASE_10, CAP_BASE_11};
use log::{debug, trace};
use quick_xml::de::from_str;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use time::OffsetDateTime;

/// An open NETCONF session.
///
/// Created by [`Session::open`] (usually through a
/// [`Client`](crate::transport::Client)); destroyed by [`Session::close`].
/// Once open, the negotiated codec and session-id never change.
pub struct Session {
    transport: Box<dyn Transport>,
    codec: Codec,
    session_id: u64,
    capabilities: HashMap<String, String>,
    message_id: u64,
}

impl Session {
    /// Performs the hello exchange on `transport` and returns the
    /// established session. On any failure the transport is closed and the
    /// first error returned.
    pub async fn open<T>(transport: T) -> Result<Session>
    where
        T: Transport + 'static,
    {
        let mut session = Session {
            transport: Box::new(transport),
            codec: Codec::V10,
            session_id: 0,
            capabilities: HashMap::new(),
            message_id: 0,
        };
        match session.hello().await {
            Ok(()) => Ok(session),
            Err(err) => {
                let _ = session.transport.close().await;
                Err(err)
            }
        }
    }

    /// Session identifier assigned by the server, always nonzero.
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Negotiated message framing.
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Server capabilities keyed by URI, with the `?`-query portion as
    /// value (empty when absent).
    pub fn capabilities(&self) -> &HashMap<String, String> {
        &self.capabilities
    }

    pub fn has_capability(&self, uri: &str) -> bool {
        self.capabilities.contains_key(uri)
    }

    async fn hello(&mut self) -> Result<()> {
        let hello = Hello::new();
        self.write_frame(hello.to_xml()?.as_bytes()).await?;

        let doc = self.read_frame().await?;
        trace!("hello:\n{}", doc);
        let hello: Hello = from_str(&doc)?;
        match hello.session_id() {
            Some(id) if id != 0 => self.session_id = id,
            _ => return Err(Error::Capabilities("server hello carries no session-id")),
        }
        self.capabilities = hello.capability_map();

        if self.capabilities.contains_key(CAP_BASE_11) {
            self.codec = Codec::V11;
        } else if !self.capabilities.contains_key(CAP_BASE_10) {
            return Err(Error::Capabilities("no common base protocol version"));
        }
        debug!(
            "session {} established with {:?} framing",
            self.session_id, self.codec
        );
        Ok(())
    }

    async fn write_frame(&mut self, payload: &[u8]) -> Result<()> {
        let mut framer = FrameWriter::new(self.codec, &mut self.transport);
        framer.write_all(payload).await?;
        framer.finish().await
    }

    async fn read_frame(&mut self) -> Result<String> {
        let mut unframer = FrameReader::new(self.codec, &mut self.transport);
        let mut raw = Vec::new();
        unframer.read_to_end(&mut raw).await?;
        Ok(String::from_utf8_lossy(&raw).trim().to_string())
    }

    /// Sends one RPC without waiting for the reply.
    pub async fn send<O: Operation>(&mut self, request: &O) -> Result<()> {
        self.message_id += 1;
        let doc = Rpc::new(self.message_id, request).to_xml()?;
        trace!("rpc:\n{}", doc);
        self.write_frame(doc.as_bytes()).await
    }

    async fn read_reply(&mut self) -> Result<String> {
        loop {
            let doc = self.read_frame().await?;
            match root_element(&doc).as_deref() {
                Some("rpc-reply") => {
                    trace!("reply:\n{}", doc);
                    return Ok(doc);
                }
                Some(other) => {
                    debug!("discarding interleaved <{}> while awaiting reply", other);
                }
                None => {
                    return Err(Error::new("inbound message has no root element".to_string()))
                }
            }
        }
    }

    /// Issues an RPC and decodes its `<rpc-reply>` into `T`.
    ///
    /// `<rpc-error>` children are not interpreted on this path; decode
    /// into [`RpcReply`] or use [`Session::call_simple`] to surface them.
    pub async fn call<O, T>(&mut self, request: &O) -> Result<T>
    where
        O: Operation,
        T: DeserializeOwned,
    {
        self.send(request).await?;
        let doc = self.read_reply().await?;
        Ok(from_str(&doc)?)
    }

    /// Issues an RPC and returns the raw reply document after checking it
    /// for `<rpc-error>` children.
    pub async fn rpc<O: Operation>(&mut self, request: &O) -> Result<String> {
        self.send(request).await?;
        let doc = self.read_reply().await?;
        let reply: RpcReply = from_str(&doc)?;
        match reply.into_first_error() {
            Some(error) => Err(Error::Rpc(error)),
            None => Ok(doc),
        }
    }

    /// Issues an RPC whose reply carries no payload, surfacing the first
    /// `<rpc-error>` if any.
    pub async fn call_simple<O: Operation>(&mut self, request: &O) -> Result<()> {
        self.rpc(request).await.map(|_| ())
    }

    /// Receives one server-initiated document decoded into `T`, e.g. after
    /// a successful subscription.
    pub async fn receive<T: DeserializeOwned>(&mut self) -> Result<T> {
        let doc = self.read_frame().await?;
        Ok(from_str(&doc)?)
    }

    /// Receives one `<notification>`.
    pub async fn notification(&mut self) -> Result<Notification> {
        let doc = self.read_frame().await?;
        trace!("notification:\n{}", doc);
        doc.parse()
    }

    /// `<get>` as defined in [RFC 6241 7.7](https://www.rfc-editor.org/rfc/rfc6241.html#section-7.7),
    /// returning the raw reply document.
    pub async fn get(
        &mut self,
        filter: Option<Filter>,
        defaults: Option<WithDefaultsValue>,
    ) -> Result<String> {
        self.rpc(&Get::new(filter, defaults)).await
    }

    /// `<get-config>` as defined in [RFC 6241 7.1](https://www.rfc-editor.org/rfc/rfc6241.html#section-7.1).
    /// `source` is the datastore to query.
    pub async fn get_config(
        &mut self,
        source: Datastore,
        filter: Option<Filter>,
        defaults: Option<WithDefaultsValue>,
    ) -> Result<String> {
        self.rpc(&GetConfig::new(source, filter, defaults)).await
    }

    /// `<edit-config>` with a verbatim `<config>` body.
    pub async fn edit_config(
        &mut self,
        target: Datastore,
        config: &str,
        default_operation: Option<DefaultOperation>,
        test_option: Option<TestOption>,
        error_option: Option<ErrorOption>,
    ) -> Result<()> {
        self.call_simple(&EditConfig::new(
            target,
            config,
            default_operation,
            test_option,
            error_option,
        ))
        .await
    }

    pub async fn copy_config(&mut self, target: Datastore, source: Datastore) -> Result<()> {
        self.call_simple(&CopyConfig::new(target, source)).await
    }

    pub async fn delete_config(&mut self, target: Datastore) -> Result<()> {
        self.call_simple(&DeleteConfig::new(target)).await
    }

    pub async fn lock(&mut self, target: Datastore) -> Result<()> {
        self.call_simple(&Lock::new(target)).await
    }

    pub async fn unlock(&mut self, target: Datastore) -> Result<()> {
        self.call_simple(&Unlock::new(target)).await
    }

    pub async fn commit(&mut self) -> Result<()> {
        self.call_simple(&Commit::new()).await
    }

    pub async fn confirmed_commit(
        &mut self,
        confirm_timeout: Option<u32>,
        persist: Option<String>,
        persist_id: Option<String>,
    ) -> Result<()> {
        self.call_simple(&Commit::confirmed(confirm_timeout, persist, persist_id))
            .await
    }

    pub async fn cancel_commit(&mut self, persist_id: Option<String>) -> Result<()> {
        self.call_simple(&CancelCommit::new(persist_id)).await
    }

    pub async fn discard_changes(&mut self) -> Result<()> {
        self.call_simple(&DiscardChanges).await
    }

    pub async fn validate(&mut self, source: Datastore) -> Result<()> {
        self.call_simple(&Validate::new(source)).await
    }

    pub async fn validate_config(&mut self, config: &str) -> Result<()> {
        self.call_simple(&ValidateConfig::new(config)).await
    }

    pub async fn kill_session(&mut self, session_id: u64) -> Result<()> {
        self.call_simple(&KillSession::new(session_id)).await
    }

    /// `<get-schema>` as defined in [RFC 6022](https://www.rfc-editor.org/rfc/rfc6022.html),
    /// returning the schema text.
    pub async fn get_schema(
        &mut self,
        identifier: &str,
        version: Option<&str>,
        format: Option<&str>,
    ) -> Result<String> {
        let reply = self
            .rpc(&GetSchema::new(identifier, version, format))
            .await?;
        let data = inner_xml(&reply, "data")
            .ok_or_else(|| Error::new("get-schema reply carries no <data> element".to_string()))?;
        unescape_xml(&data)
    }

    /// `<create-subscription>` as defined in [RFC 5277 2.1.1](https://www.rfc-editor.org/rfc/rfc5277.html#section-2.1.1).
    ///
    /// The reply is delivered before any notification of the subscription;
    /// iterate [`Session::notification`] afterwards.
    pub async fn create_subscription(
        &mut self,
        stream: Option<&str>,
        filter: Option<Filter>,
        start_time: Option<OffsetDateTime>,
        stop_time: Option<OffsetDateTime>,
    ) -> Result<()> {
        self.call_simple(&CreateSubscription::new(
            stream, filter, start_time, stop_time,
        ))
        .await
    }

    /// YANG-Push `<establish-subscription>` streaming the subtree selected
    /// by `xpath_filter` every `period` centiseconds.
    pub async fn establish_subscription(&mut self, xpath_filter: &str, period: u32) -> Result<()> {
        self.call_simple(&EstablishSubscription::periodic(xpath_filter, period))
            .await
    }

    /// Gracefully closes the session: best-effort `<close-session>`, then
    /// transport shutdown. The first error encountered is returned.
    pub async fn close(mut self) -> Result<()> {
        let result = self.call_simple(&CloseSession).await;
        let closed = self.transport.close().await;
        result.and(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ErrorTag, ReplyData};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};
    use time::macros::datetime;
    use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

    const HELLO_V11: &str = r#"<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><session-id>42</session-id><capabilities><capability>urn:ietf:params:netconf:base:1.0</capability><capability>urn:ietf:params:netconf:base:1.1</capability></capabilities></hello>"#;
    const HELLO_V10: &str = r#"<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><session-id>7</session-id><capabilities><capability>urn:ietf:params:netconf:base:1.0</capability></capabilities></hello>"#;

    fn v10_frame(doc: &str) -> Vec<u8> {
        format!("{doc}]]>]]>").into_bytes()
    }

    fn v11_frame(doc: &str) -> Vec<u8> {
        format!("\n#{}\n{doc}\n##\n", doc.len()).into_bytes()
    }

    struct StubTransport {
        input: Cursor<Vec<u8>>,
        written: Arc<Mutex<Vec<u8>>>,
        closed: Arc<AtomicBool>,
    }

    impl StubTransport {
        fn new(input: Vec<u8>) -> (StubTransport, Arc<Mutex<Vec<u8>>>, Arc<AtomicBool>) {
            let written = Arc::new(Mutex::new(Vec::new()));
            let closed = Arc::new(AtomicBool::new(false));
            let transport = StubTransport {
                input: Cursor::new(input),
                written: written.clone(),
                closed: closed.clone(),
            };
            (transport, written, closed)
        }
    }

    impl AsyncRead for StubTransport {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Pin::new(&mut self.input).poll_read(cx, buf)
        }
    }

    impl AsyncWrite for StubTransport {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            self.written.lock().unwrap().extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn close(&mut self) -> Result<()> {
            self.closed.store(true, Ordering::Relaxed);
            Ok(())
        }
    }

    fn written_string(written: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(written.lock().unwrap().clone()).unwrap()
    }

    #[tokio::test]
    async fn hello_negotiates_chunked_framing() {
        let mut input = v10_frame(HELLO_V11);
        input.extend(v11_frame(r#"<rpc-reply message-id="1"><ok/></rpc-reply>"#));
        let (transport, written, _) = StubTransport::new(input);

        let mut session = Session::open(transport).await.unwrap();
        assert_eq!(session.session_id(), 42);
        assert_eq!(session.codec(), Codec::V11);
        assert!(session.has_capability("urn:ietf:params:netconf:base:1.1"));

        session.commit().await.unwrap();
        let wire = written_string(&written);
        let (hello, rpc) = wire.split_once("]]>]]>").unwrap();
        assert!(hello.starts_with("<hello"));
        assert!(rpc.starts_with("\n#"), "rpc not chunked: {rpc}");
        assert!(rpc.ends_with("\n##\n"));
    }

    #[tokio::test]
    async fn hello_missing_session_id_fails_and_closes() {
        let hello = r#"<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><capabilities><capability>urn:ietf:params:netconf:base:1.0</capability></capabilities></hello>"#;
        let (transport, _, closed) = StubTransport::new(v10_frame(hello));

        let result = Session::open(transport).await;
        assert!(matches!(result, Err(Error::Capabilities(_))));
        assert!(closed.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn hello_without_common_version_fails() {
        let hello = r#"<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><session-id>3</session-id><capabilities><capability>urn:example:private</capability></capabilities></hello>"#;
        let (transport, _, closed) = StubTransport::new(v10_frame(hello));

        let result = Session::open(transport).await;
        assert!(matches!(result, Err(Error::Capabilities(_))));
        assert!(closed.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn get_roundtrip_over_eom_framing() {
        let mut input = v10_frame(HELLO_V10);
        input.extend(v10_frame(
            r#"<rpc-reply message-id="1"><data><foo/></data></rpc-reply>"#,
        ));
        let (transport, written, _) = StubTransport::new(input);

        let mut session = Session::open(transport).await.unwrap();
        assert_eq!(session.codec(), Codec::V10);

        let reply = session
            .get(Some(Filter::xpath("/foo")), None)
            .await
            .unwrap();
        let data: ReplyData = reply.parse().unwrap();
        assert_eq!(data.data, "<foo/>");

        let wire = written_string(&written);
        assert!(wire.contains(r#"<rpc message-id="1" xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">"#));
        assert!(wire.contains(r#"<filter type="xpath" select="/foo"/>"#));
    }

    #[tokio::test]
    async fn subscription_then_notification_then_reply() {
        let notification = r#"<notification xmlns="urn:ietf:params:xml:ns:netconf:notification:1.0"><eventTime>2020-01-01T00:00:00Z</eventTime><x/></notification>"#;
        let mut input = v10_frame(HELLO_V11);
        input.extend(v11_frame(r#"<rpc-reply message-id="1"><ok/></rpc-reply>"#));
        input.extend(v11_frame(notification));
        input.extend(v11_frame(
            r#"<rpc-reply message-id="2"><data><foo/></data></rpc-reply>"#,
        ));
        let (transport, _, _) = StubTransport::new(input);

        let mut session = Session::open(transport).await.unwrap();
        session
            .establish_subscription("/foo", 100)
            .await
            .unwrap();

        let notification = session.notification().await.unwrap();
        assert_eq!(notification.event_time, datetime!(2020-01-01 00:00:00 UTC));
        assert_eq!(notification.content, "<x/>");

        let reply = session.get(None, None).await.unwrap();
        let data: ReplyData = reply.parse().unwrap();
        assert_eq!(data.data, "<foo/>");
    }

    #[tokio::test]
    async fn call_skips_interleaved_notification() {
        let notification = r#"<notification xmlns="urn:ietf:params:xml:ns:netconf:notification:1.0"><eventTime>2020-01-01T00:00:00Z</eventTime><x/></notification>"#;
        let mut input = v10_frame(HELLO_V10);
        input.extend(v10_frame(notification));
        input.extend(v10_frame(r#"<rpc-reply message-id="1"><ok/></rpc-reply>"#));
        let (transport, _, _) = StubTransport::new(input);

        let mut session = Session::open(transport).await.unwrap();
        session.commit().await.unwrap();
    }

    #[tokio::test]
    async fn rpc_error_is_surfaced() {
        let reply = r#"<rpc-reply message-id="1"><rpc-error><error-type>application</error-type><error-tag>operation-failed</error-tag><error-severity>error</error-severity><error-message>nope</error-message></rpc-error></rpc-reply>"#;
        let mut input = v10_frame(HELLO_V10);
        input.extend(v10_frame(reply));
        let (transport, _, _) = StubTransport::new(input);

        let mut session = Session::open(transport).await.unwrap();
        match session.commit().await {
            Err(Error::Rpc(error)) => {
                assert_eq!(error.error_tag, ErrorTag::OperationFailed);
                assert_eq!(error.error_message.as_deref(), Some("nope"));
            }
            other => panic!("expected rpc error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn message_ids_increase_from_one() {
        let mut input = v10_frame(HELLO_V10);
        input.extend(v10_frame(r#"<rpc-reply message-id="1"><ok/></rpc-reply>"#));
        input.extend(v10_frame(r#"<rpc-reply message-id="2"><ok/></rpc-reply>"#));
        let (transport, written, _) = StubTransport::new(input);

        let mut session = Session::open(transport).await.unwrap();
        session.commit().await.unwrap();
        session.discard_changes().await.unwrap();

        let wire = written_string(&written);
        assert!(wire.contains(r#"<rpc message-id="1""#));
        assert!(wire.contains(r#"<rpc message-id="2""#));
    }

    #[tokio::test]
    async fn close_sends_close_session_and_shuts_transport() {
        let mut input = v10_frame(HELLO_V10);
        input.extend(v10_frame(r#"<rpc-reply message-id="1"><ok/></rpc-reply>"#));
        let (transport, written, closed) = StubTransport::new(input);

        let session = Session::open(transport).await.unwrap();
        session.close().await.unwrap();

        assert!(written_string(&written).contains("<close-session/>"));
        assert!(closed.load(Ordering::Relaxed));
    }
}
