use anyhow::anyhow;

use super::{WL_WORD_LEN, roundup_4, u32_from_wire, u32_to_wire};

/// Represents a Wayland protocol array type.
///
/// A blob of arbitrary data, prefixed with a 32-bit integer specifying its length
/// (in bytes), then the verbatim contents of the array, padded to 32 bits.
///
/// Unlike strings, arrays do not include a NUL terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WlArray {
    /// The size of the array data in bytes, excluding padding.
    size: u32,
    /// The array content, padded to 32-bit alignment.
    data: Vec<u8>,
}

impl WlArray {
    /// Creates a new Wayland array from byte data, padding it to a word boundary.
    pub fn new(buffer: &[u8]) -> Self {
        let mut data = buffer.to_vec();
        data.resize(roundup_4(buffer.len()), 0);

        Self {
            size: buffer.len() as u32,
            data,
        }
    }

    /// Returns the total buffer size required for serialization: the 4-byte
    /// length prefix plus the padded content.
    pub fn buffer_size(&self) -> usize {
        WL_WORD_LEN + self.data.len()
    }

    /// Returns the actual array data as a slice, excluding padding.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.size as usize]
    }

    /// Interprets the content as a sequence of 32-bit words.
    ///
    /// Enum-valued arrays such as `xdg_toplevel.configure` states use this
    /// layout. A trailing partial word is ignored.
    pub fn words(&self) -> Vec<u32> {
        self.as_slice()
            .chunks_exact(WL_WORD_LEN)
            .map(|chunk| u32_from_wire([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }
}

impl std::fmt::Display for WlArray {
    /// Shows the array size and the hexadecimal representation of the data bytes.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data_dump = self
            .as_slice()
            .iter()
            .map(|b| format!("0x{:02X}", b))
            .collect::<Vec<String>>()
            .join(", ");

        write!(
            f,
            "WlArray {{ size: {}, data: [ {} ] }}",
            self.size, data_dump
        )
    }
}

impl From<WlArray> for Vec<u8> {
    /// Serializes the array into the Wayland wire format.
    fn from(array: WlArray) -> Self {
        let mut buffer = Vec::with_capacity(array.buffer_size());

        buffer.extend_from_slice(&u32_to_wire(array.size));
        buffer.extend_from_slice(&array.data);

        buffer
    }
}

impl TryFrom<&[u8]> for WlArray {
    type Error = anyhow::Error;

    /// Deserializes a Wayland array from the wire format.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Buffer is too short for the length prefix (less than 4 bytes)
    /// - Buffer is too short for the declared array content
    fn try_from(buffer: &[u8]) -> anyhow::Result<WlArray> {
        if buffer.len() < WL_WORD_LEN {
            return Err(anyhow!(
                "Buffer too short for WlArray length field: expected at least {} bytes, got {}",
                WL_WORD_LEN,
                buffer.len()
            ));
        }

        let content_len = u32_from_wire(buffer[..WL_WORD_LEN].try_into()?) as usize;
        let total_buffer_len = WL_WORD_LEN + roundup_4(content_len);

        if buffer.len() < total_buffer_len {
            return Err(anyhow!(
                "Buffer too short for WlArray content: expected at least {} bytes, got {}",
                total_buffer_len,
                buffer.len()
            ));
        }

        Ok(WlArray {
            size: content_len as u32,
            data: buffer[WL_WORD_LEN..total_buffer_len].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_state_words() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&8u32.to_le_bytes());
        raw.extend_from_slice(&1u32.to_le_bytes());
        raw.extend_from_slice(&4u32.to_le_bytes());

        let array = WlArray::try_from(raw.as_slice()).unwrap();
        assert_eq!(array.buffer_size(), 12);
        assert_eq!(array.words(), vec![1, 4]);
    }

    #[test]
    fn pads_odd_sized_content() {
        let encoded: Vec<u8> = WlArray::new(&[1, 2, 3]).into();
        assert_eq!(encoded, vec![3, 0, 0, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn rejects_truncated_content() {
        let raw = [8u8, 0, 0, 0, 1, 2, 3, 4];
        assert!(WlArray::try_from(&raw[..]).is_err());
    }
}
