pub mod delete_id;
pub mod error;

use crate::protocol::DecodeEvent;

/// Represents the events that can be emitted by the Wayland display object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Indicates a fatal (non-recoverable) error has occurred in the protocol.
    ///
    /// This event is sent when a serious error occurs, typically in response to a
    /// client request. The error details include the object where the error occurred,
    /// an interface-specific error code, and a descriptive message for debugging.
    Error(error::Error),

    /// Acknowledges object ID deletion and allows safe ID reuse.
    ///
    /// When the compositor destroys an object (or acknowledges the client's
    /// destruction of one), it sends this event. Upon receipt, the client knows
    /// it can safely reuse the object ID for new objects.
    DeleteId(delete_id::DeleteId),
}

impl DecodeEvent for Event {
    /// Decodes a `wl_display` event.
    ///
    /// # Protocol Context
    /// The display object uses opcode 0 for error notifications and opcode 1 for
    /// delete ID acknowledgments as defined in the Wayland core protocol specification.
    fn decode(opcode: u16, body: &[u8]) -> anyhow::Result<Option<Event>> {
        match opcode {
            0 => Ok(Some(Event::Error(body.try_into()?))),
            1 => Ok(Some(Event::DeleteId(body.try_into()?))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::ArgWriter;

    #[test]
    fn decodes_delete_id() {
        let body = ArgWriter::new().uint(9).finish();

        let event = Event::decode(1, &body).unwrap();
        assert_eq!(event, Some(Event::DeleteId(delete_id::DeleteId { id: 9 })));
    }

    #[test]
    fn unknown_opcode_is_not_an_error() {
        assert_eq!(Event::decode(7, &[]).unwrap(), None);
    }
}
