pub mod global;
pub mod global_remove;

use crate::protocol::DecodeEvent;

/// Represents the events that can be emitted by the Wayland registry object.
///
/// The registry emits events to notify clients of available globals and of
/// their removal due to device hotplugs, reconfiguration, or other system events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Announces the availability of a new global object.
    ///
    /// Clients typically respond by creating a local object using the bind request.
    Global(global::Global),

    /// Announces the removal of a previously advertised global object.
    ///
    /// If the client bound to this global, the object remains technically valid
    /// but requests to it will be ignored until it is destroyed.
    GlobalRemove(global_remove::GlobalRemove),
}

impl DecodeEvent for Event {
    /// Decodes a `wl_registry` event.
    ///
    /// # Protocol Behavior
    /// When a client first creates a registry object, it receives an initial burst of
    /// `Global` events for all currently available globals. The client marks the end
    /// of this initial burst with `wl_display.sync` issued right after `get_registry`.
    fn decode(opcode: u16, body: &[u8]) -> anyhow::Result<Option<Event>> {
        match opcode {
            0 => Ok(Some(Event::Global(body.try_into()?))),
            1 => Ok(Some(Event::GlobalRemove(body.try_into()?))),
            _ => Ok(None),
        }
    }
}
