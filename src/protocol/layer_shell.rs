//! `zwlr_layer_shell_v1` and `zwlr_layer_surface_v1`: the optional
//! layer-shell role, placing a surface on a desktop layer instead of making
//! it a window.

use super::{
    DecodeEvent,
    message::WlMessage,
    types::{ArgReader, ArgWriter, WlNewId, WlObject},
};
use crate::wl_enum;

pub const INTERFACE: &str = "zwlr_layer_shell_v1";
pub const SURFACE_INTERFACE: &str = "zwlr_layer_surface_v1";

const SHELL_GET_LAYER_SURFACE: u16 = 0;
const SURFACE_SET_SIZE: u16 = 0;
const SURFACE_ACK_CONFIGURE: u16 = 6;

wl_enum! {
    Layer {
        Background = 0,
        Bottom = 1,
        Top = 2,
        Overlay = 3,
    }
}

/// Parameters for `zwlr_layer_shell_v1.get_layer_surface`.
pub struct GetLayerSurfaceParam<'a> {
    pub new_id: WlNewId,
    pub surface: WlObject,
    /// `None` lets the compositor pick the output.
    pub output: Option<WlObject>,
    pub layer: Layer,
    pub namespace: &'a str,
}

impl From<GetLayerSurfaceParam<'_>> for Vec<u8> {
    fn from(args: GetLayerSurfaceParam<'_>) -> Vec<u8> {
        ArgWriter::new()
            .new_id(args.new_id)
            .object(args.surface)
            .object(args.output.unwrap_or(0))
            .uint(args.layer.into())
            .string(args.namespace)
            .finish()
    }
}

/// Builds `zwlr_layer_shell_v1.get_layer_surface`.
pub fn get_layer_surface(
    layer_shell: WlObject,
    param: GetLayerSurfaceParam<'_>,
) -> anyhow::Result<WlMessage> {
    WlMessage::new(layer_shell, SHELL_GET_LAYER_SURFACE, param.into())
}

/// Builds `zwlr_layer_surface_v1.set_size`.
pub fn set_size(layer_surface: WlObject, width: u32, height: u32) -> anyhow::Result<WlMessage> {
    WlMessage::new(
        layer_surface,
        SURFACE_SET_SIZE,
        ArgWriter::new().uint(width).uint(height).finish(),
    )
}

/// Builds `zwlr_layer_surface_v1.ack_configure`.
pub fn ack_configure(layer_surface: WlObject, serial: u32) -> anyhow::Result<WlMessage> {
    WlMessage::new(
        layer_surface,
        SURFACE_ACK_CONFIGURE,
        ArgWriter::new().uint(serial).finish(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Configure { serial: u32, width: u32, height: u32 },
    /// The surface will not be shown again; terminal for this client.
    Closed,
}

impl DecodeEvent for SurfaceEvent {
    fn decode(opcode: u16, body: &[u8]) -> anyhow::Result<Option<SurfaceEvent>> {
        let mut reader = ArgReader::new(body);
        let event = match opcode {
            0 => SurfaceEvent::Configure {
                serial: reader.uint()?,
                width: reader.uint()?,
                height: reader.uint()?,
            },
            1 => SurfaceEvent::Closed,
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::WlString;

    #[test]
    fn null_output_is_encoded_as_zero() {
        let msg = get_layer_surface(
            9,
            GetLayerSurfaceParam {
                new_id: 12,
                surface: 10,
                output: None,
                layer: Layer::Top,
                namespace: "demo",
            },
        )
        .unwrap();

        assert_eq!(&msg.data[8..12], &0u32.to_le_bytes());
        assert_eq!(&msg.data[12..16], &2u32.to_le_bytes());
        let (namespace, _) = WlString::decode(&msg.data[16..]).unwrap();
        assert_eq!(String::from(&namespace), "demo");
    }
}
