pub mod wlarray;
pub mod wlstring;

pub use wlarray::WlArray;
pub use wlstring::WlString;

use anyhow::anyhow;

pub type WlUInt = u32;
pub type WlInt = i32;
pub type WlObject = u32;
pub type WlNewId = u32;

/// Size in bytes of every fixed-width wire argument (uint, int, object, new_id, enum).
pub const WL_WORD_LEN: usize = size_of::<u32>();

/// Byte order of every integer written to or read from the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Native,
}

/// The byte order this client speaks.
///
/// Compositors use the host order, which is little endian on every platform
/// this client targets. Pinning it keeps the encoding independent of the
/// machine the tests run on.
pub const WIRE_BYTE_ORDER: ByteOrder = ByteOrder::Little;

/// Encodes a 32-bit word in [`WIRE_BYTE_ORDER`].
pub fn u32_to_wire(value: u32) -> [u8; 4] {
    match WIRE_BYTE_ORDER {
        ByteOrder::Little => value.to_le_bytes(),
        ByteOrder::Native => value.to_ne_bytes(),
    }
}

/// Decodes a 32-bit word in [`WIRE_BYTE_ORDER`].
pub fn u32_from_wire(bytes: [u8; 4]) -> u32 {
    match WIRE_BYTE_ORDER {
        ByteOrder::Little => u32::from_le_bytes(bytes),
        ByteOrder::Native => u32::from_ne_bytes(bytes),
    }
}

/// Rounds a size up to the nearest multiple of 4 for 32-bit alignment.
///
/// # Examples
///
/// ```
/// use wayland_window_from_scratch::protocol::types::roundup_4;
///
/// assert_eq!(roundup_4(5), 8);
/// assert_eq!(roundup_4(8), 8);
/// assert_eq!(roundup_4(9), 12);
/// ```
pub fn roundup_4(number: usize) -> usize {
    (number + 3) & !3
}

/// A forward-only cursor over the argument section of a message body.
///
/// Each accessor consumes exactly the bytes its wire type occupies, padding
/// included, so arguments can be read in declaration order.
pub struct ArgReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ArgReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Reads a `uint` argument.
    pub fn uint(&mut self) -> anyhow::Result<WlUInt> {
        let end = self.pos + WL_WORD_LEN;
        if self.buf.len() < end {
            return Err(anyhow!(
                "Buffer too short for uint argument at offset {}: expected {} bytes, got {}",
                self.pos,
                end,
                self.buf.len()
            ));
        }

        let value = u32_from_wire(self.buf[self.pos..end].try_into()?);
        self.pos = end;
        Ok(value)
    }

    /// Reads an `int` argument.
    pub fn int(&mut self) -> anyhow::Result<WlInt> {
        Ok(self.uint()? as i32)
    }

    /// Reads an `object` argument.
    pub fn object(&mut self) -> anyhow::Result<WlObject> {
        self.uint()
    }

    /// Reads a `string` argument, advancing past its NUL terminator and padding.
    pub fn string(&mut self) -> anyhow::Result<WlString> {
        let (string, consumed) = WlString::decode(&self.buf[self.pos..])?;
        self.pos += consumed;
        Ok(string)
    }

    /// Reads an `array` argument, advancing past its padding.
    pub fn array(&mut self) -> anyhow::Result<WlArray> {
        let array = WlArray::try_from(&self.buf[self.pos..])?;
        self.pos += array.buffer_size();
        Ok(array)
    }

    /// Number of bytes already consumed.
    pub fn position(&self) -> usize {
        self.pos
    }
}

/// Builds the argument section of a request body.
#[derive(Default)]
pub struct ArgWriter {
    buf: Vec<u8>,
}

impl ArgWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uint(mut self, value: WlUInt) -> Self {
        self.buf.extend_from_slice(&u32_to_wire(value));
        self
    }

    pub fn int(self, value: WlInt) -> Self {
        self.uint(value as u32)
    }

    pub fn object(self, id: WlObject) -> Self {
        self.uint(id)
    }

    pub fn new_id(self, id: WlNewId) -> Self {
        self.uint(id)
    }

    pub fn string(mut self, value: &str) -> Self {
        let encoded: Vec<u8> = WlString::from(value).into();
        self.buf.extend_from_slice(&encoded);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
