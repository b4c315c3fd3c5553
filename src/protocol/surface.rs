//! `wl_surface`: the drawable that buffers are attached to.

use super::{
    DecodeEvent,
    message::WlMessage,
    types::{ArgReader, ArgWriter, WlInt, WlNewId, WlObject},
};

pub const INTERFACE: &str = "wl_surface";

/// First `wl_surface` version that has `damage_buffer`.
pub const DAMAGE_BUFFER_SINCE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WlSurfaceRequest {
    Attach = 1,
    Damage = 2,
    Frame = 3,
    Commit = 6,
    DamageBuffer = 9,
}

impl From<WlSurfaceRequest> for u16 {
    fn from(request: WlSurfaceRequest) -> u16 {
        request as u16
    }
}

/// A damaged rectangle, in surface or buffer coordinates depending on the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: WlInt,
    pub y: WlInt,
    pub width: WlInt,
    pub height: WlInt,
}

/// Builds `wl_surface.attach` of `buffer` at offset `(x, y)`.
pub fn attach(surface: WlObject, buffer: WlObject, x: WlInt, y: WlInt) -> anyhow::Result<WlMessage> {
    WlMessage::new(
        surface,
        WlSurfaceRequest::Attach.into(),
        ArgWriter::new().object(buffer).int(x).int(y).finish(),
    )
}

/// Builds `wl_surface.damage` (surface coordinates).
pub fn damage(surface: WlObject, rect: Rect) -> anyhow::Result<WlMessage> {
    damage_request(surface, WlSurfaceRequest::Damage, rect)
}

/// Builds `wl_surface.damage_buffer` (buffer coordinates, version 4+).
pub fn damage_buffer(surface: WlObject, rect: Rect) -> anyhow::Result<WlMessage> {
    damage_request(surface, WlSurfaceRequest::DamageBuffer, rect)
}

fn damage_request(
    surface: WlObject,
    request: WlSurfaceRequest,
    rect: Rect,
) -> anyhow::Result<WlMessage> {
    WlMessage::new(
        surface,
        request.into(),
        ArgWriter::new()
            .int(rect.x)
            .int(rect.y)
            .int(rect.width)
            .int(rect.height)
            .finish(),
    )
}

/// Builds `wl_surface.frame`, requesting a one-shot frame callback.
pub fn frame(surface: WlObject, callback: WlNewId) -> anyhow::Result<WlMessage> {
    WlMessage::new(
        surface,
        WlSurfaceRequest::Frame.into(),
        ArgWriter::new().new_id(callback).finish(),
    )
}

/// Builds `wl_surface.commit`, applying all pending state atomically.
pub fn commit(surface: WlObject) -> anyhow::Result<WlMessage> {
    WlMessage::new(surface, WlSurfaceRequest::Commit.into(), Vec::new())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Enter { output: WlObject },
    Leave { output: WlObject },
    PreferredBufferScale { factor: WlInt },
    PreferredBufferTransform { transform: u32 },
}

impl DecodeEvent for Event {
    fn decode(opcode: u16, body: &[u8]) -> anyhow::Result<Option<Event>> {
        let mut reader = ArgReader::new(body);
        let event = match opcode {
            0 => Event::Enter {
                output: reader.object()?,
            },
            1 => Event::Leave {
                output: reader.object()?,
            },
            2 => Event::PreferredBufferScale {
                factor: reader.int()?,
            },
            3 => Event::PreferredBufferTransform {
                transform: reader.uint()?,
            },
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_is_header_only() {
        let raw: Vec<u8> = commit(7).unwrap().into();
        assert_eq!(raw, [7u32.to_le_bytes(), ((8u32 << 16) | 6).to_le_bytes()].concat());
    }

    #[test]
    fn damage_variants_differ_only_in_opcode() {
        let rect = Rect {
            x: 0,
            y: 0,
            width: 100,
            height: 100,
        };
        let surface_damage = damage(7, rect).unwrap();
        let buffer_damage = damage_buffer(7, rect).unwrap();

        assert_eq!(surface_damage.opcode(), 2);
        assert_eq!(buffer_damage.opcode(), 9);
        assert_eq!(surface_damage.data, buffer_damage.data);
    }
}
