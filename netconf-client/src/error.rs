use crate::message::RpcError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the client, from message framing up to RPC replies.
///
/// Framing, capabilities and transport errors are terminal for the session;
/// an [`Error::Rpc`] leaves the session usable.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] std::io::Error),
    #[cfg(feature = "async-ssh2-lite")]
    #[error(transparent)]
    Ssh(#[from] async_ssh2_lite::Error),
    #[error("message framing error: {0}")]
    Framing(&'static str),
    #[error("capabilities exchange failed: {0}")]
    Capabilities(&'static str),
    #[error(transparent)]
    Encoding(#[from] quick_xml::DeError),
    #[error("remote procedure call failed: {0}")]
    Rpc(#[from] RpcError),
    #[error("unknown datastore {unknown} (expected one of {expected:?})")]
    UnknownDatastore {
        expected: &'static [&'static str],
        unknown: String,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn new(msg: String) -> Self {
        Error::Other(anyhow::Error::msg(msg))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Encoding(err.into())
    }
}

impl From<quick_xml::SeError> for Error {
    fn from(err: quick_xml::SeError) -> Self {
        Error::Encoding(quick_xml::DeError::Custom(err.to_string()))
    }
}
