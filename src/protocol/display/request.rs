use crate::protocol::{
    WL_DISPLAY_ID,
    message::WlMessage,
    types::{ArgWriter, WlNewId},
};

/// Represents the request types that can be sent to the Wayland display object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WlDisplayRequest {
    /// Creates a synchronization point with the compositor.
    /// Returns a callback object that fires when all previous requests have been processed.
    Sync = 0,

    /// Retrieves the global registry object for interface discovery.
    /// This is typically the first request clients make after connecting.
    GetRegistry = 1,
}

impl From<WlDisplayRequest> for u16 {
    /// Converts a `WlDisplayRequest` variant to its corresponding protocol opcode.
    fn from(request: WlDisplayRequest) -> u16 {
        request as u16
    }
}

/// Parameters for the `wl_display.sync` request.
///
/// This request creates a synchronization barrier between client and server.
/// The compositor will emit a 'done' event on the returned callback object
/// when all previous requests have been processed, ensuring ordered execution.
///
/// # Specification Reference
/// ```xml
/// <request name="sync">
///   <description summary="asynchronous roundtrip">
///     The sync request asks the server to emit the 'done' event
///     on the returned wl_callback object. Since requests are
///     handled in-order and events are delivered in-order, this can
///     be used as a barrier to ensure all previous requests and the
///     resulting events have been handled.
///   </description>
///   <arg name="callback" type="new_id" interface="wl_callback"
///        summary="callback object for the sync request"/>
/// </request>
/// ```
pub struct WlDisplaySyncParam {
    /// The object ID to assign to the newly created wl_callback object.
    /// The compositor will destroy this object after firing the callback.
    new_id: WlNewId,
}

impl WlDisplaySyncParam {
    pub fn new(new_id: WlNewId) -> Self {
        Self { new_id }
    }
}

impl From<WlDisplaySyncParam> for Vec<u8> {
    /// Serializes the synchronization parameters into the Wayland wire format.
    ///
    /// # Wire Format
    /// - Bytes 0-3: `new_id` (u32) - The ID for the new callback object
    fn from(args: WlDisplaySyncParam) -> Vec<u8> {
        ArgWriter::new().new_id(args.new_id).finish()
    }
}

/// Parameters for the `wl_display.get_registry` request.
///
/// # Specification Reference
/// ```xml
/// <request name="get_registry">
///   <description summary="get global registry object">
///     This request creates a registry object that allows the client
///     to list and bind the global objects available from the
///     compositor.
///   </description>
///   <arg name="registry" type="new_id" interface="wl_registry"
///        summary="global registry object"/>
/// </request>
/// ```
pub struct WlDisplayGetRegistryParam {
    /// The object ID to assign to the newly created wl_registry object.
    new_id: WlNewId,
}

impl WlDisplayGetRegistryParam {
    pub fn new(new_id: WlNewId) -> Self {
        Self { new_id }
    }
}

impl From<WlDisplayGetRegistryParam> for Vec<u8> {
    /// # Wire Format
    /// - Bytes 0-3: `new_id` (u32) - The ID for the new registry object
    fn from(args: WlDisplayGetRegistryParam) -> Vec<u8> {
        ArgWriter::new().new_id(args.new_id).finish()
    }
}

/// Builds a `wl_display.sync` request creating callback `callback`.
pub fn sync(callback: WlNewId) -> anyhow::Result<WlMessage> {
    WlMessage::new(
        WL_DISPLAY_ID,
        WlDisplayRequest::Sync.into(),
        WlDisplaySyncParam::new(callback).into(),
    )
}

/// Builds a `wl_display.get_registry` request creating registry `registry`.
///
/// The server-side resources consumed by `get_registry` are only released
/// when the client disconnects, so this is sent exactly once per connection.
pub fn get_registry(registry: WlNewId) -> anyhow::Result<WlMessage> {
    WlMessage::new(
        WL_DISPLAY_ID,
        WlDisplayRequest::GetRegistry.into(),
        WlDisplayGetRegistryParam::new(registry).into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_registry_targets_display() {
        let raw: Vec<u8> = get_registry(2).unwrap().into();

        assert_eq!(raw.len(), 12);
        assert_eq!(&raw[0..4], &1u32.to_le_bytes());
        assert_eq!(&raw[4..8], &((12u32 << 16) | 1).to_le_bytes());
        assert_eq!(&raw[8..12], &2u32.to_le_bytes());
    }

    #[test]
    fn sync_carries_callback_id() {
        let msg = sync(3).unwrap();

        assert_eq!(msg.opcode(), 0);
        assert_eq!(msg.data, 3u32.to_le_bytes().to_vec());
    }
}
