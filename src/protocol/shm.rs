//! `wl_shm` and `wl_shm_pool`: shared-memory buffer negotiation.
//!
//! The pool's backing memory travels as a file descriptor in the ancillary
//! data of the `create_pool` message; the message body only carries the new
//! id and the pool size.

use super::{
    DecodeEvent,
    message::WlMessage,
    types::{ArgReader, ArgWriter, WlInt, WlNewId, WlObject},
};
use crate::wl_enum;

pub const INTERFACE: &str = "wl_shm";
pub const POOL_INTERFACE: &str = "wl_shm_pool";

const SHM_CREATE_POOL: u16 = 0;
const POOL_CREATE_BUFFER: u16 = 0;

wl_enum! {
    /// Pixel formats every compositor must support.
    ///
    /// Both are 32 bits per pixel, stored little endian as `[31:0] A:R:G:B`
    /// (`X` meaning the alpha byte is ignored).
    Format {
        Argb8888 = 0,
        Xrgb8888 = 1,
    }
}

impl Format {
    pub fn bytes_per_pixel(self) -> u32 {
        4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Advertises one supported pixel format (raw code, may be a DRM fourcc).
    Format { format: u32 },
}

impl DecodeEvent for Event {
    fn decode(opcode: u16, body: &[u8]) -> anyhow::Result<Option<Event>> {
        match opcode {
            0 => Ok(Some(Event::Format {
                format: ArgReader::new(body).uint()?,
            })),
            _ => Ok(None),
        }
    }
}

/// Builds `wl_shm.create_pool`.
///
/// The `fd` argument has no bytes in the body; the caller must send the
/// returned message together with the pool's descriptor.
pub fn create_pool(shm: WlObject, pool: WlNewId, size: WlInt) -> anyhow::Result<WlMessage> {
    WlMessage::new(
        shm,
        SHM_CREATE_POOL,
        ArgWriter::new().new_id(pool).int(size).finish(),
    )
}

/// Parameters for `wl_shm_pool.create_buffer`.
///
/// ```xml
/// <request name="create_buffer">
///   <arg name="id" type="new_id" interface="wl_buffer"/>
///   <arg name="offset" type="int"/>
///   <arg name="width" type="int"/>
///   <arg name="height" type="int"/>
///   <arg name="stride" type="int"/>
///   <arg name="format" type="uint" enum="format"/>
/// </request>
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateBufferParam {
    pub new_id: WlNewId,
    pub offset: WlInt,
    pub width: WlInt,
    pub height: WlInt,
    pub stride: WlInt,
    pub format: Format,
}

impl From<CreateBufferParam> for Vec<u8> {
    fn from(args: CreateBufferParam) -> Vec<u8> {
        ArgWriter::new()
            .new_id(args.new_id)
            .int(args.offset)
            .int(args.width)
            .int(args.height)
            .int(args.stride)
            .uint(args.format.into())
            .finish()
    }
}

/// Builds `wl_shm_pool.create_buffer`.
pub fn create_buffer(pool: WlObject, param: CreateBufferParam) -> anyhow::Result<WlMessage> {
    WlMessage::new(pool, POOL_CREATE_BUFFER, param.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_pool_has_no_fd_bytes() {
        let msg = create_pool(5, 8, 40_000).unwrap();

        assert_eq!(msg.header.message_len(), 16);
        assert_eq!(&msg.data[..4], &8u32.to_le_bytes());
        assert_eq!(&msg.data[4..], &40_000u32.to_le_bytes());
    }

    #[test]
    fn create_buffer_argument_order() {
        let msg = create_buffer(
            8,
            CreateBufferParam {
                new_id: 9,
                offset: 0,
                width: 100,
                height: 100,
                stride: 400,
                format: Format::Xrgb8888,
            },
        )
        .unwrap();

        let words: Vec<u32> = msg
            .data
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
            .collect();
        assert_eq!(words, vec![9, 0, 100, 100, 400, 1]);
    }
}
