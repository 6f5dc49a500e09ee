//! Z85-over-zero-padded-buffer encoding for the two snapshot fields
//! (`description`, `metadata`) that aren't safe to embed directly in the
//! hierarchical key-value snapshot format (it strips newlines and
//! arbitrary bytes). Z85 only accepts input whose length is a multiple
//! of 4 bytes, so the buffer is zero-padded up to that boundary before
//! encoding and the padding is trimmed back off after decoding.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZError {
    #[error("z85 decode failed: {0}")]
    Decode(#[from] z85::DecodeError),
    #[error("decoded bytes are not valid UTF-8")]
    InvalidUtf8,
}

pub fn encode(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let mut padded = s.as_bytes().to_vec();
    let padded_len = (padded.len() + 3) & !3;
    padded.resize(padded_len, 0);
    z85::encode(&padded)
}

pub fn decode(s: &str) -> Result<String, ZError> {
    if s.is_empty() {
        return Ok(String::new());
    }
    let mut bytes = z85::decode(s)?;
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    String::from_utf8(bytes).map_err(|_| ZError::InvalidUtf8)
}
