//! # netconf-client
//!
//! Async NETCONF ([RFC 6241]) client. The crate covers the session layer:
//! the hello exchange that negotiates protocol capabilities, both message
//! framing codecs of [RFC 6242] (end-of-message and chunked), RPC/reply
//! multiplexing with interleaved notifications, and a typed catalog of the
//! standard operations including RFC 5277 notification subscriptions,
//! RFC 6022 `<get-schema>` and YANG-Push event subscriptions.
//!
//! The transport is any full-duplex byte stream implementing
//! [`transport::Transport`]; the bundled SSH implementation (feature
//! `async-ssh2-lite`) requests the `netconf` subsystem on one channel per
//! session, so several sessions can share one authenticated connection.
//!
//! ```no_run
//! # #[cfg(feature = "async-ssh2-lite")]
//! # async fn example() -> netconf_client::error::Result<()> {
//! use netconf_client::transport::{ssh::SshClient, Client};
//!
//! let mut client = SshClient::new_with_user_auth("10.0.0.1:830", "admin", "admin").await?;
//! let mut session = client.new_session().await?;
//! let reply = session.get_config("running".parse()?, None, None).await?;
//! println!("{reply}");
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod framer;
pub mod message;
pub mod session;
pub mod transport;

pub use error::{Error, Result};
pub use framer::Codec;
pub use session::Session;

/// NETCONF base protocol namespace.
pub const NS_NETCONF: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";
/// RFC 5277 notification namespace.
pub const NS_NOTIFICATION: &str = "urn:ietf:params:xml:ns:netconf:notification:1.0";
/// Notification stream discovery namespace.
pub const NS_NETMOD_NOTIFICATION: &str = "urn:ietf:params:xml:ns:netmod:notification";
/// RFC 6022 NETCONF monitoring namespace.
pub const NS_MONITORING: &str = "urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring";
/// RFC 6243 with-defaults namespace.
pub const NS_WITH_DEFAULTS: &str = "urn:ietf:params:xml:ns:yang:ietf-netconf-with-defaults";
/// YANG-Push datastore subscription namespace.
pub const NS_YANG_PUSH: &str = "urn:ietf:params:xml:ns:yang:ietf-yang-push";
/// Event notification namespace used by `<establish-subscription>`.
pub const NS_EVENT_NOTIFICATIONS: &str = "urn:ietf:params:xml:ns:yang:ietf-event-notifications";
/// YANG 1.1 namespace, carrier of `<action>` invocations.
pub const NS_YANG: &str = "urn:ietf:params:xml:ns:yang:1";
/// Tail-f proprietary action extension namespace.
pub const NS_TAILF_ACTIONS: &str = "http://tail-f.com/ns/netconf/actions/1.0";

/// Capability URI of the base:1.0 protocol version.
pub const CAP_BASE_10: &str = "urn:ietf:params:netconf:base:1.0";
/// Capability URI of the base:1.1 protocol version (chunked framing).
pub const CAP_BASE_11: &str = "urn:ietf:params:netconf:base:1.1";
pub const CAP_CONFIRMED_COMMIT: &str = "urn:ietf:params:netconf:capability:confirmed-commit:1.1";
pub const CAP_VALIDATE: &str = "urn:ietf:params:netconf:capability:validate:1.1";
pub const CAP_WITH_DEFAULTS: &str = "urn:ietf:params:netconf:capability:with-defaults:1.0";
pub const CAP_NOTIFICATION: &str = "urn:ietf:params:netconf:capability:notification:1.0";
pub const CAP_INTERLEAVE: &str = "urn:ietf:params:netconf:capability:interleave:1.0";
pub const CAP_STARTUP: &str = "urn:ietf:params:netconf:capability:startup:1.0";
pub const CAP_WRITABLE_RUNNING: &str = "urn:ietf:params:netconf:capability:writable-running:1.0";
pub const CAP_CANDIDATE: &str = "urn:ietf:params:netconf:capability:candidate:1.0";
pub const CAP_ROLLBACK_ON_ERROR: &str = "urn:ietf:params:netconf:capability:rollback-on-error:1.0";
pub const CAP_URL: &str = "urn:ietf:params:netconf:capability:url:1.0";
pub const CAP_XPATH: &str = "urn:ietf:params:netconf:capability:xpath:1.0";
pub const CAP_MONITORING: &str = NS_MONITORING;
pub const CAP_TAILF_ACTIONS: &str = NS_TAILF_ACTIONS;
