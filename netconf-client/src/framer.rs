//! NETCONF message framing per [RFC 6242](https://tools.ietf.org/html/rfc6242).
//!
//! Both peers speak end-of-message framing until the hello exchange settles
//! the protocol version; a base:1.1 peer then switches to chunked framing.
//! [`FrameWriter`] and [`FrameReader`] are scoped to exactly one message
//! each: a writer must be [`finish`](FrameWriter::finish)ed to emit the
//! terminator, and a reader abandoned before end-of-message must be
//! [`finish`](FrameReader::finish)ed to drain up to the terminator,
//! otherwise the transport is stuck mid-message and the session is lost.

use crate::error::{Error, Result};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// NETCONF 1.0 end-of-message delimiter sequence.
const EOM: &[u8; 6] = b"]]>]]>";

/// Largest chunk-size value permitted by RFC 6242 chunked framing.
const MAX_CHUNK_SIZE: u64 = 4_294_967_295;

/// Message framing selected during the hello exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// base:1.0 framing, messages terminated by `]]>]]>`.
    V10,
    /// base:1.1 chunked framing with `\n#N\n` headers and `\n##\n` trailer.
    V11,
}

/// Writer for a single outbound message.
///
/// Payload bytes pass through unmodified. The v1.0 codec does not escape
/// the `]]>]]>` delimiter inside the payload; callers must not produce it
/// outside CDATA sections.
pub struct FrameWriter<'a, W: AsyncWrite + Unpin> {
    codec: Codec,
    writer: &'a mut W,
}

impl<'a, W: AsyncWrite + Unpin> FrameWriter<'a, W> {
    pub fn new(codec: Codec, writer: &'a mut W) -> FrameWriter<'a, W> {
        FrameWriter { codec, writer }
    }

    /// Appends payload bytes to the message. Under chunked framing every
    /// non-empty call becomes one chunk.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match self.codec {
            Codec::V10 => self.writer.write_all(data).await?,
            Codec::V11 => {
                if !data.is_empty() {
                    let header = format!("\n#{}\n", data.len());
                    self.writer.write_all(header.as_bytes()).await?;
                    self.writer.write_all(data).await?;
                }
            }
        }
        Ok(())
    }

    /// Terminates the message and flushes the transport.
    pub async fn finish(self) -> Result<()> {
        match self.codec {
            Codec::V10 => self.writer.write_all(EOM).await?,
            Codec::V11 => self.writer.write_all(b"\n##\n").await?,
        }
        self.writer.flush().await?;
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum ReadState {
    /// v1.0: sliding window over the last bytes read, one delimiter long.
    Window { buf: [u8; EOM.len()], len: usize },
    /// v1.1: positioned before a chunk header.
    BetweenChunks,
    /// v1.1: inside a chunk with this many payload bytes outstanding.
    InChunk(u64),
    Done,
    Failed(&'static str),
}

/// Reader for a single inbound message.
///
/// [`read`](FrameReader::read) surfaces only payload bytes and returns
/// `Ok(0)` once the message terminator has been consumed, leaving the
/// transport positioned at the next message boundary. Framing violations
/// fail the reader permanently.
pub struct FrameReader<'a, R: AsyncRead + Unpin> {
    reader: &'a mut R,
    state: ReadState,
}

impl<'a, R: AsyncRead + Unpin> FrameReader<'a, R> {
    pub fn new(codec: Codec, reader: &'a mut R) -> FrameReader<'a, R> {
        let state = match codec {
            Codec::V10 => ReadState::Window {
                buf: [0; EOM.len()],
                len: 0,
            },
            Codec::V11 => ReadState::BetweenChunks,
        };
        FrameReader { reader, state }
    }

    /// Reads payload bytes into `out`, returning `Ok(0)` at end-of-message.
    pub async fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        match self.state {
            ReadState::Done => Ok(0),
            ReadState::Failed(reason) => Err(Error::Framing(reason)),
            ReadState::Window { .. } => self.read_eom(out).await,
            ReadState::BetweenChunks | ReadState::InChunk(_) => self.read_chunked(out).await,
        }
    }

    /// Drains any remaining payload up to the message terminator.
    pub async fn finish(mut self) -> Result<()> {
        let mut sink = [0u8; 64];
        loop {
            if self.read(&mut sink).await? == 0 {
                return Ok(());
            }
        }
    }

    /// Reads the whole message, appending the payload to `out`.
    pub async fn read_to_end(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let mut chunk = [0u8; 1024];
        loop {
            let n = self.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }

    fn fail(&mut self, reason: &'static str) -> Error {
        self.state = ReadState::Failed(reason);
        Error::Framing(reason)
    }

    async fn read_eom(&mut self, out: &mut [u8]) -> Result<usize> {
        let ReadState::Window { mut buf, mut len } = self.state else {
            unreachable!("read_eom outside v1.0 state");
        };

        while len < buf.len() {
            let n = match self.reader.read(&mut buf[len..]).await {
                Ok(0) => return Err(self.fail("unexpected end of stream")),
                Ok(n) => n,
                Err(err) => {
                    self.state = ReadState::Failed("transport error");
                    return Err(err.into());
                }
            };
            len += n;
        }

        // Earliest window suffix matching a delimiter prefix; everything
        // before it cannot be part of the delimiter and is safe to deliver.
        let mut split = 0;
        while split < buf.len() {
            if buf[split..] == EOM[..buf.len() - split] {
                break;
            }
            split += 1;
        }

        if split == 0 {
            self.state = ReadState::Done;
            return Ok(0);
        }

        let n = split.min(out.len());
        out[..n].copy_from_slice(&buf[..n]);
        buf.copy_within(n.., 0);
        len -= n;
        self.state = ReadState::Window { buf, len };
        Ok(n)
    }

    async fn read_chunked(&mut self, out: &mut [u8]) -> Result<usize> {
        let remaining = match self.state {
            ReadState::InChunk(n) => n,
            ReadState::BetweenChunks => match self.read_chunk_header().await? {
                Some(n) => n,
                None => {
                    self.state = ReadState::Done;
                    return Ok(0);
                }
            },
            _ => unreachable!("read_chunked outside v1.1 state"),
        };

        let want = remaining.min(out.len() as u64) as usize;
        let n = match self.reader.read(&mut out[..want]).await {
            Ok(0) => return Err(self.fail("unexpected end of stream")),
            Ok(n) => n,
            Err(err) => {
                self.state = ReadState::Failed("transport error");
                return Err(err.into());
            }
        };

        self.state = match remaining - n as u64 {
            0 => ReadState::BetweenChunks,
            left => ReadState::InChunk(left),
        };
        Ok(n)
    }

    /// Parses `\n#<size>\n`, or `None` for the `\n##\n` end-of-chunks marker.
    async fn read_chunk_header(&mut self) -> Result<Option<u64>> {
        if self.read_byte().await? != b'\n' {
            return Err(self.fail("malformed chunk header"));
        }
        if self.read_byte().await? != b'#' {
            return Err(self.fail("malformed chunk header"));
        }

        let mut byte = self.read_byte().await?;
        if byte == b'#' {
            if self.read_byte().await? != b'\n' {
                return Err(self.fail("malformed chunk header"));
            }
            return Ok(None);
        }

        let mut size: u64 = 0;
        loop {
            match byte {
                b'0'..=b'9' => {
                    size = size * 10 + u64::from(byte - b'0');
                    if size > MAX_CHUNK_SIZE {
                        return Err(self.fail("chunk size exceeds protocol limit"));
                    }
                }
                b'\n' => {
                    if size == 0 {
                        return Err(self.fail("zero-length chunk"));
                    }
                    return Ok(Some(size));
                }
                _ => return Err(self.fail("malformed chunk header")),
            }
            byte = self.read_byte().await?;
        }
    }

    async fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        match self.reader.read_exact(&mut byte).await {
            Ok(_) => Ok(byte[0]),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                Err(self.fail("unexpected end of stream"))
            }
            Err(err) => {
                self.state = ReadState::Failed("transport error");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    async fn decode(codec: Codec, wire: &[u8]) -> Result<Vec<u8>> {
        let mut stream = Cursor::new(wire.to_vec());
        let mut reader = FrameReader::new(codec, &mut stream);
        let mut payload = Vec::new();
        reader.read_to_end(&mut payload).await?;
        // end-of-message stays terminal
        assert_eq!(reader.read(&mut [0u8; 8]).await?, 0);
        Ok(payload)
    }

    #[tokio::test]
    async fn eom_roundtrip() {
        let payload = br#"<rpc message-id="1"><get/></rpc>"#;
        let mut wire = Cursor::new(Vec::new());
        let mut writer = FrameWriter::new(Codec::V10, &mut wire);
        writer.write_all(payload).await.unwrap();
        writer.finish().await.unwrap();

        let wire = wire.into_inner();
        assert!(wire.ends_with(b"]]>]]>"));
        assert_eq!(decode(Codec::V10, &wire).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn eom_partial_delimiter_in_payload() {
        // "]]>" and "]]" fragments slide through the window unharmed
        let payload = b"x]]>y]]";
        let mut wire = payload.to_vec();
        wire.extend_from_slice(b"]]>]]>");
        assert_eq!(decode(Codec::V10, &wire).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn eom_truncated_is_framing_error() {
        let result = decode(Codec::V10, b"<rpc-reply/>").await;
        assert!(matches!(result, Err(Error::Framing(_))));
    }

    #[tokio::test]
    async fn eom_next_message_left_in_stream() {
        let mut stream = Cursor::new(b"first]]>]]>second]]>]]>".to_vec());
        for expected in [&b"first"[..], &b"second"[..]] {
            let mut reader = FrameReader::new(Codec::V10, &mut stream);
            let mut payload = Vec::new();
            reader.read_to_end(&mut payload).await.unwrap();
            assert_eq!(payload, expected);
        }
    }

    #[tokio::test]
    async fn chunked_roundtrip_multiple_chunks() {
        let mut wire = Cursor::new(Vec::new());
        let mut writer = FrameWriter::new(Codec::V11, &mut wire);
        writer.write_all(b"<rpc-").await.unwrap();
        writer.write_all(b"reply></rpc-reply>").await.unwrap();
        writer.finish().await.unwrap();

        let wire = wire.into_inner();
        assert_eq!(wire, b"\n#5\n<rpc-\n#18\nreply></rpc-reply>\n##\n");
        assert_eq!(
            decode(Codec::V11, &wire).await.unwrap(),
            b"<rpc-reply></rpc-reply>"
        );
    }

    #[tokio::test]
    async fn chunked_empty_write_emits_no_chunk() {
        let mut wire = Cursor::new(Vec::new());
        let mut writer = FrameWriter::new(Codec::V11, &mut wire);
        writer.write_all(b"").await.unwrap();
        writer.write_all(b"<ok/>").await.unwrap();
        writer.finish().await.unwrap();
        assert_eq!(wire.into_inner(), b"\n#5\n<ok/>\n##\n");
    }

    #[tokio::test]
    async fn chunked_decode_teacher_sized_chunks() {
        let wire = b"\n#4\n<rpc\n#7\n-reply>\n#1\n\n\n#12\n</rpc-reply>\n##\n";
        assert_eq!(
            decode(Codec::V11, wire).await.unwrap(),
            b"<rpc-reply>\n</rpc-reply>"
        );
    }

    #[tokio::test]
    async fn chunked_missing_hash_is_framing_error() {
        let result = decode(Codec::V11, b"\n5\n<rpc/>\n##\n").await;
        assert!(matches!(result, Err(Error::Framing(_))));
    }

    #[tokio::test]
    async fn chunked_zero_length_chunk_is_framing_error() {
        for wire in [&b"\n#0\n\n##\n"[..], &b"\n#\n"[..]] {
            let result = decode(Codec::V11, wire).await;
            assert!(matches!(result, Err(Error::Framing(_))));
        }
    }

    #[tokio::test]
    async fn chunked_oversize_chunk_is_framing_error() {
        let result = decode(Codec::V11, b"\n#4294967296\nx\n##\n").await;
        assert!(matches!(result, Err(Error::Framing(_))));
    }

    #[tokio::test]
    async fn chunked_eof_mid_chunk_is_framing_error() {
        let result = decode(Codec::V11, b"\n#10\n<rpc>").await;
        assert!(matches!(result, Err(Error::Framing(_))));
    }

    #[tokio::test]
    async fn chunked_error_is_sticky() {
        let mut stream = Cursor::new(b"\nbogus".to_vec());
        let mut reader = FrameReader::new(Codec::V11, &mut stream);
        let mut sink = [0u8; 8];
        assert!(matches!(reader.read(&mut sink).await, Err(Error::Framing(_))));
        assert!(matches!(reader.read(&mut sink).await, Err(Error::Framing(_))));
    }

    #[tokio::test]
    async fn finish_drains_abandoned_message() {
        let mut stream = Cursor::new(b"\n#7\nskipped\n##\nnext".to_vec());
        let reader = FrameReader::new(Codec::V11, &mut stream);
        reader.finish().await.unwrap();

        let mut rest = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut stream, &mut rest)
            .await
            .unwrap();
        assert_eq!(rest, b"next");
    }
}
