//! Global text encoding
//!
//! All connections share a single encoding resolved once at startup. The
//! default is UTF-8; legacy deployments run regional encodings such as GBK,
//! so the label is configurable rather than hard-wired.

use encoding_rs::Encoding;

use crate::error::RelayError;

/// Text codec backed by a statically resolved `encoding_rs` encoding
///
/// Cheap to copy: holds only a `&'static Encoding` reference.
#[derive(Debug, Clone, Copy)]
pub struct TextCodec {
    encoding: &'static Encoding,
}

impl TextCodec {
    /// Resolve an encoding label (`utf-8`, `gbk`, ...)
    ///
    /// An unknown label is a startup error, never a per-connection one.
    pub fn for_label(label: &str) -> Result<Self, RelayError> {
        Encoding::for_label(label.as_bytes())
            .map(|encoding| Self { encoding })
            .ok_or_else(|| RelayError::UnknownEncoding(label.to_string()))
    }

    /// Canonical name of the configured encoding
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decode one inbound chunk
    ///
    /// A malformed byte sequence rejects the whole message rather than
    /// being silently replaced; the caller drops it and keeps the
    /// connection.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, RelayError> {
        let (text, had_errors) = self.encoding.decode_without_bom_handling(bytes);
        if had_errors {
            return Err(RelayError::Decode(self.name()));
        }
        Ok(text.into_owned())
    }

    /// Encode one outbound line
    ///
    /// Characters the encoding cannot represent are replaced; outbound
    /// delivery is best-effort.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let (bytes, _, _) = self.encoding.encode(text);
        bytes.into_owned()
    }
}
