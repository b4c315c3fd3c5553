//! `wl_buffer`: a pixel source attached to surfaces.

use super::DecodeEvent;

pub const INTERFACE: &str = "wl_buffer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The compositor no longer reads from the buffer.
    Release,
}

impl DecodeEvent for Event {
    fn decode(opcode: u16, _body: &[u8]) -> anyhow::Result<Option<Event>> {
        match opcode {
            0 => Ok(Some(Event::Release)),
            _ => Ok(None),
        }
    }
}
