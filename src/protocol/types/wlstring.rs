use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;

use super::{WL_WORD_LEN, roundup_4, u32_from_wire, u32_to_wire};

const WL_NUL: u8 = 0;

/// Represents a Wayland protocol string.
///
/// Wayland strings are serialized with:
/// - 32-bit length prefix (in bytes, counting the NUL terminator)
/// - String content in UTF-8 encoding
/// - NUL terminator byte
/// - Padding to 32-bit alignment
///
/// Only the content is stored; the length prefix and padding are derived.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WlString {
    /// The string content, without NUL terminator or padding.
    data: Vec<u8>,
}

impl WlString {
    /// The value of the 32-bit length prefix: content plus the NUL terminator.
    pub fn wire_len(&self) -> u32 {
        (self.data.len() + 1) as u32
    }

    /// Calculates the total buffer size required for serializing this Wayland string.
    ///
    /// # Calculation
    /// `4 + roundup_4(content + 1)`, where:
    /// - `4` bytes for the 32-bit length prefix
    /// - `content + 1` for the bytes and the NUL terminator, padded to a word
    ///
    /// # Examples
    /// ```
    /// use wayland_window_from_scratch::protocol::types::WlString;
    ///
    /// assert_eq!(WlString::from("hi").buffer_len(), 8); // 4 + (2 + 1 + 1 pad)
    /// assert_eq!(WlString::from("wl_compositor").buffer_len(), 20); // 4 + (13 + 1 + 2 pad)
    /// assert_eq!(WlString::from("").buffer_len(), 8); // 4 + (0 + 1 + 3 pad)
    /// ```
    pub fn buffer_len(&self) -> usize {
        WL_WORD_LEN + roundup_4(self.wire_len() as usize)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Deserializes a Wayland string and reports how many bytes it occupied.
    ///
    /// The consumed count includes the length prefix, the NUL terminator and
    /// the padding, so callers can advance a cursor to the next argument.
    ///
    /// A zero length prefix is the protocol's null string; it decodes as an
    /// empty string occupying only the prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Buffer is too short for the length field
    /// - Buffer is too short for the declared (padded) string length
    /// - The byte at the declared terminator position is not NUL
    pub fn decode(buf: &[u8]) -> anyhow::Result<(WlString, usize)> {
        if buf.len() < WL_WORD_LEN {
            return Err(anyhow!(
                "Buffer too short for WlString length field: expected at least 4 bytes, got {}",
                buf.len()
            ));
        }

        let wire_len = u32_from_wire(buf[..WL_WORD_LEN].try_into()?) as usize;
        if wire_len == 0 {
            return Ok((WlString::default(), WL_WORD_LEN));
        }

        let consumed = WL_WORD_LEN + roundup_4(wire_len);
        if buf.len() < consumed {
            return Err(anyhow!(
                "Buffer too short for WlString content: expected at least {} bytes, got {}",
                consumed,
                buf.len()
            ));
        }

        let content_end = WL_WORD_LEN + wire_len - 1;
        if buf[content_end] != WL_NUL {
            return Err(anyhow!(
                "Missing NUL terminator in WlString at offset {}",
                content_end
            ));
        }

        let data = buf[WL_WORD_LEN..content_end].to_vec();
        Ok((WlString { data }, consumed))
    }
}

impl From<&str> for WlString {
    fn from(s: &str) -> Self {
        Self {
            data: s.as_bytes().to_vec(),
        }
    }
}

impl From<String> for WlString {
    /// Converts a Rust String to a Wayland protocol string.
    fn from(s: String) -> Self {
        Self {
            data: s.into_bytes(),
        }
    }
}

impl From<&WlString> for String {
    /// Converts a reference to a Wayland protocol string to a Rust String.
    ///
    /// Invalid UTF-8 sequences are replaced with the Unicode replacement
    /// character (�); the original WlString stays usable.
    fn from(wls: &WlString) -> String {
        String::from_utf8_lossy(&wls.data).into_owned()
    }
}

impl From<WlString> for Vec<u8> {
    /// Serializes a Wayland string to the wire format.
    ///
    /// Produces a byte vector containing:
    /// 1. 32-bit length prefix (content + NUL)
    /// 2. String content bytes
    /// 3. NUL terminator byte
    /// 4. Padding bytes to reach 32-bit alignment
    fn from(wls: WlString) -> Vec<u8> {
        let mut result = Vec::with_capacity(wls.buffer_len());

        result.extend_from_slice(&u32_to_wire(wls.wire_len()));
        result.extend_from_slice(&wls.data);
        result.push(WL_NUL);

        let padded_len = roundup_4(result.len());
        result.resize(padded_len, 0);

        result
    }
}

impl TryFrom<&[u8]> for WlString {
    type Error = anyhow::Error;

    /// Deserializes a Wayland string from wire format bytes, discarding the
    /// consumed length. See [`WlString::decode`].
    fn try_from(buf: &[u8]) -> anyhow::Result<WlString> {
        Ok(WlString::decode(buf)?.0)
    }
}

impl Display for WlString {
    /// Formats the string with its protocol length for protocol debugging.
    ///
    /// # Output Format
    /// `WlString { len: <protocol_length>, data: "<content>" }`
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let content = String::from_utf8_lossy(&self.data);
        write!(
            f,
            "WlString {{ len: {}, data: \"{}\" }}",
            self.wire_len(),
            content
        )
    }
}
