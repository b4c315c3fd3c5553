//! The xdg-shell window-management interfaces: `xdg_wm_base`, `xdg_surface`
//! and `xdg_toplevel`.
//!
//! `xdg_wm_base` turns a `wl_surface` into an `xdg_surface`, which in turn is
//! given the toplevel role. The compositor drives the surface through
//! `configure` events that must each be acknowledged before content for
//! that configuration is committed.

use super::{
    DecodeEvent,
    message::WlMessage,
    types::{ArgReader, ArgWriter, WlInt, WlNewId, WlObject},
};
use crate::wl_enum;

pub const WM_BASE_INTERFACE: &str = "xdg_wm_base";
pub const SURFACE_INTERFACE: &str = "xdg_surface";
pub const TOPLEVEL_INTERFACE: &str = "xdg_toplevel";

const WM_BASE_GET_XDG_SURFACE: u16 = 2;
const WM_BASE_PONG: u16 = 3;
const SURFACE_GET_TOPLEVEL: u16 = 1;
const SURFACE_ACK_CONFIGURE: u16 = 4;
const TOPLEVEL_SET_TITLE: u16 = 2;
const TOPLEVEL_SET_APP_ID: u16 = 3;

wl_enum! {
    /// States carried in the `xdg_toplevel.configure` states array.
    ToplevelState {
        Maximized = 1,
        Fullscreen = 2,
        Resizing = 3,
        Activated = 4,
        TiledLeft = 5,
        TiledRight = 6,
        TiledTop = 7,
        TiledBottom = 8,
        Suspended = 9,
    }
}

/// Builds `xdg_wm_base.get_xdg_surface`.
pub fn get_xdg_surface(
    wm_base: WlObject,
    xdg_surface: WlNewId,
    surface: WlObject,
) -> anyhow::Result<WlMessage> {
    WlMessage::new(
        wm_base,
        WM_BASE_GET_XDG_SURFACE,
        ArgWriter::new().new_id(xdg_surface).object(surface).finish(),
    )
}

/// Builds `xdg_wm_base.pong`, answering the ping with `serial`.
pub fn pong(wm_base: WlObject, serial: u32) -> anyhow::Result<WlMessage> {
    WlMessage::new(wm_base, WM_BASE_PONG, ArgWriter::new().uint(serial).finish())
}

/// Builds `xdg_surface.get_toplevel`.
pub fn get_toplevel(xdg_surface: WlObject, toplevel: WlNewId) -> anyhow::Result<WlMessage> {
    WlMessage::new(
        xdg_surface,
        SURFACE_GET_TOPLEVEL,
        ArgWriter::new().new_id(toplevel).finish(),
    )
}

/// Builds `xdg_surface.ack_configure` for `serial`.
pub fn ack_configure(xdg_surface: WlObject, serial: u32) -> anyhow::Result<WlMessage> {
    WlMessage::new(
        xdg_surface,
        SURFACE_ACK_CONFIGURE,
        ArgWriter::new().uint(serial).finish(),
    )
}

/// Builds `xdg_toplevel.set_title`.
pub fn set_title(toplevel: WlObject, title: &str) -> anyhow::Result<WlMessage> {
    WlMessage::new(
        toplevel,
        TOPLEVEL_SET_TITLE,
        ArgWriter::new().string(title).finish(),
    )
}

/// Builds `xdg_toplevel.set_app_id`.
pub fn set_app_id(toplevel: WlObject, app_id: &str) -> anyhow::Result<WlMessage> {
    WlMessage::new(
        toplevel,
        TOPLEVEL_SET_APP_ID,
        ArgWriter::new().string(app_id).finish(),
    )
}

/// Events of `xdg_wm_base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmBaseEvent {
    /// Liveness check; must be answered with `pong` carrying the same serial.
    Ping { serial: u32 },
}

impl DecodeEvent for WmBaseEvent {
    fn decode(opcode: u16, body: &[u8]) -> anyhow::Result<Option<WmBaseEvent>> {
        match opcode {
            0 => Ok(Some(WmBaseEvent::Ping {
                serial: ArgReader::new(body).uint()?,
            })),
            _ => Ok(None),
        }
    }
}

/// Events of `xdg_surface`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// Marks the end of a configure sequence; must be acked with `serial`.
    Configure { serial: u32 },
}

impl DecodeEvent for SurfaceEvent {
    fn decode(opcode: u16, body: &[u8]) -> anyhow::Result<Option<SurfaceEvent>> {
        match opcode {
            0 => Ok(Some(SurfaceEvent::Configure {
                serial: ArgReader::new(body).uint()?,
            })),
            _ => Ok(None),
        }
    }
}

/// Events of `xdg_toplevel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToplevelEvent {
    /// Suggested size (0 means "client decides") and raw state values.
    Configure {
        width: WlInt,
        height: WlInt,
        states: Vec<u32>,
    },
    /// The user asked for the window to be closed.
    Close,
    ConfigureBounds {
        width: WlInt,
        height: WlInt,
    },
    WmCapabilities {
        capabilities: Vec<u32>,
    },
}

impl DecodeEvent for ToplevelEvent {
    fn decode(opcode: u16, body: &[u8]) -> anyhow::Result<Option<ToplevelEvent>> {
        let mut reader = ArgReader::new(body);
        let event = match opcode {
            0 => ToplevelEvent::Configure {
                width: reader.int()?,
                height: reader.int()?,
                states: reader.array()?.words(),
            },
            1 => ToplevelEvent::Close,
            2 => ToplevelEvent::ConfigureBounds {
                width: reader.int()?,
                height: reader.int()?,
            },
            3 => ToplevelEvent::WmCapabilities {
                capabilities: reader.array()?.words(),
            },
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::WlArray;

    #[test]
    fn toplevel_configure_with_states() {
        let mut states = Vec::new();
        states.extend_from_slice(&4u32.to_le_bytes());
        states.extend_from_slice(&1u32.to_le_bytes());

        let mut body = ArgWriter::new().int(800).int(600).finish();
        let array: Vec<u8> = WlArray::new(&states).into();
        body.extend_from_slice(&array);

        let event = ToplevelEvent::decode(0, &body).unwrap().unwrap();
        assert_eq!(
            event,
            ToplevelEvent::Configure {
                width: 800,
                height: 600,
                states: vec![4, 1],
            }
        );
        assert_eq!(ToplevelState::try_from(4).unwrap(), ToplevelState::Activated);
    }

    #[test]
    fn close_has_no_payload() {
        assert_eq!(
            ToplevelEvent::decode(1, &[]).unwrap(),
            Some(ToplevelEvent::Close)
        );
    }

    #[test]
    fn pong_echoes_serial() {
        let msg = pong(6, 0xDEAD).unwrap();
        assert_eq!(msg.opcode(), 3);
        assert_eq!(msg.data, 0xDEADu32.to_le_bytes().to_vec());
    }

    #[test]
    fn ping_needs_serial() {
        assert!(WmBaseEvent::decode(0, &[1, 2]).is_err());
    }
}
