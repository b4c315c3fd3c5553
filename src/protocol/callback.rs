//! `wl_callback`: a one-shot completion notice.
//!
//! Used both for `wl_display.sync` round-trips and `wl_surface.frame`
//! pacing. The compositor destroys the object right after `done` and follows
//! up with `wl_display.delete_id`.

use super::{DecodeEvent, types::ArgReader};

pub const INTERFACE: &str = "wl_callback";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The callback fired. For frame callbacks the data is a timestamp in
    /// milliseconds; for sync callbacks it is the event serial.
    Done { callback_data: u32 },
}

impl DecodeEvent for Event {
    fn decode(opcode: u16, body: &[u8]) -> anyhow::Result<Option<Event>> {
        match opcode {
            0 => Ok(Some(Event::Done {
                callback_data: ArgReader::new(body).uint()?,
            })),
            _ => Ok(None),
        }
    }
}
