use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;

use super::types::{WL_WORD_LEN, u32_from_wire, u32_to_wire};

/// The fixed size of a Wayland message header in bytes (8 bytes).
///
/// Wayland message headers consist of two 32-bit words:
/// - Object ID (32 bits)
/// - Combined size (upper 16 bits) and opcode (lower 16 bits)
pub const WL_MESSAGE_HEADER_LEN: usize = 2 * WL_WORD_LEN;

/// Largest body a header can describe: the 16-bit size field minus the header.
pub const WL_MAX_BODY_LEN: usize = u16::MAX as usize - WL_MESSAGE_HEADER_LEN;

/// Represents the header of a Wayland protocol message.
///
/// Contains routing information and metadata for interpreting Wayland messages.
/// The header is always 8 bytes and precedes the variable-length message data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WlMessageHeader {
    /// The object ID that this message targets or originates from.
    pub object_id: u32,
    /// The operation code defining the specific request or event type.
    pub opcode: u16,
    /// The total message size including header and data in bytes.
    pub size: u16,
}

impl WlMessageHeader {
    /// Builds a header for a body of `body_len` bytes.
    ///
    /// # Errors
    /// Returns an error if the total size does not fit the 16-bit size field.
    pub fn new(object_id: u32, opcode: u16, body_len: usize) -> anyhow::Result<Self> {
        if body_len > WL_MAX_BODY_LEN {
            return Err(anyhow!(
                "Message body too large for object {} opcode {}: {} bytes exceeds {}",
                object_id,
                opcode,
                body_len,
                WL_MAX_BODY_LEN
            ));
        }

        Ok(Self {
            object_id,
            opcode,
            size: (WL_MESSAGE_HEADER_LEN + body_len) as u16,
        })
    }

    /// Returns the total length of the message including header and data.
    pub fn message_len(&self) -> usize {
        self.size as usize
    }

    /// Returns the number of body bytes that follow the header.
    pub fn body_len(&self) -> usize {
        self.message_len() - WL_MESSAGE_HEADER_LEN
    }

    /// Serializes the header into its two wire words.
    pub fn to_bytes(self) -> [u8; WL_MESSAGE_HEADER_LEN] {
        let size_and_opcode = ((self.size as u32) << 16) | self.opcode as u32;

        let mut bytes = [0u8; WL_MESSAGE_HEADER_LEN];
        bytes[..WL_WORD_LEN].copy_from_slice(&u32_to_wire(self.object_id));
        bytes[WL_WORD_LEN..].copy_from_slice(&u32_to_wire(size_and_opcode));
        bytes
    }
}

impl From<WlMessageHeader> for Vec<u8> {
    /// Serializes the header into the Wayland wire format:
    /// - Bytes 0-3: object_id
    /// - Bytes 4-7: `(size << 16) | opcode`
    fn from(header: WlMessageHeader) -> Vec<u8> {
        header.to_bytes().to_vec()
    }
}

impl TryFrom<&[u8]> for WlMessageHeader {
    type Error = anyhow::Error;

    /// Deserializes a header from the wire format.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Buffer is shorter than 8 bytes
    /// - The declared size is smaller than the header itself
    fn try_from(buf: &[u8]) -> anyhow::Result<Self> {
        if buf.len() < WL_MESSAGE_HEADER_LEN {
            return Err(anyhow!(
                "Buffer too short for WlMessageHeader: expected {} bytes, got {}",
                WL_MESSAGE_HEADER_LEN,
                buf.len()
            ));
        }

        let object_id = u32_from_wire(buf[0..4].try_into()?);
        let size_and_opcode = u32_from_wire(buf[4..8].try_into()?);
        let size = (size_and_opcode >> 16) as u16;
        let opcode = (size_and_opcode & 0xFFFF) as u16;

        if (size as usize) < WL_MESSAGE_HEADER_LEN {
            return Err(anyhow!(
                "Invalid WlMessageHeader size for object {}: {} is smaller than the header",
                object_id,
                size
            ));
        }

        Ok(WlMessageHeader {
            object_id,
            opcode,
            size,
        })
    }
}

impl Display for WlMessageHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WlMessageHeader {{ object_id: {}, opcode: {}, size: {} }}",
            self.object_id, self.opcode, self.size
        )
    }
}

/// A complete Wayland protocol message containing header and data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WlMessage {
    /// The message header with routing and metadata.
    pub header: WlMessageHeader,
    /// The message payload data.
    pub data: Vec<u8>,
}

impl WlMessage {
    /// Creates a new Wayland message.
    ///
    /// The size field is calculated as header length plus data length.
    ///
    /// # Errors
    /// Returns an error if the message would not fit the 16-bit size field.
    pub fn new(object_id: u32, opcode: u16, data: Vec<u8>) -> anyhow::Result<WlMessage> {
        Ok(WlMessage {
            header: WlMessageHeader::new(object_id, opcode, data.len())?,
            data,
        })
    }

    pub fn object_id(&self) -> u32 {
        self.header.object_id
    }

    pub fn opcode(&self) -> u16 {
        self.header.opcode
    }
}

impl From<WlMessage> for Vec<u8> {
    /// Serializes the complete message into wire format.
    fn from(msg: WlMessage) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(msg.header.message_len());

        bytes.extend_from_slice(&msg.header.to_bytes());
        bytes.extend_from_slice(&msg.data);

        bytes
    }
}

impl TryFrom<&[u8]> for WlMessage {
    type Error = anyhow::Error;

    /// Deserializes one complete message from the start of `buf`.
    ///
    /// Bytes past the declared size are left alone.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Buffer is shorter than header length
    /// - Buffer is shorter than the declared message size
    /// - Header contains invalid data
    fn try_from(buf: &[u8]) -> anyhow::Result<WlMessage> {
        let header = WlMessageHeader::try_from(buf)?;

        if buf.len() < header.message_len() {
            return Err(anyhow!(
                "Buffer too short for WlMessage: expected at least {} bytes, got {}",
                header.message_len(),
                buf.len()
            ));
        }

        Ok(WlMessage {
            header,
            data: buf[WL_MESSAGE_HEADER_LEN..header.message_len()].to_vec(),
        })
    }
}

impl Display for WlMessage {
    /// Formats the complete message for human-readable display.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let data_dump = self
            .data
            .iter()
            .map(|b| format!("0x{:02X}", b))
            .collect::<Vec<String>>()
            .join(", ");

        write!(
            f,
            "WlMessage {{ header: {}, data: [{}] }}",
            self.header, data_dump
        )
    }
}
