//! `wl_compositor`: the surface factory.

use super::{
    message::WlMessage,
    types::{ArgWriter, WlNewId, WlObject},
};

pub const INTERFACE: &str = "wl_compositor";

const CREATE_SURFACE: u16 = 0;

/// Builds `wl_compositor.create_surface`.
pub fn create_surface(compositor: WlObject, surface: WlNewId) -> anyhow::Result<WlMessage> {
    WlMessage::new(
        compositor,
        CREATE_SURFACE,
        ArgWriter::new().new_id(surface).finish(),
    )
}
