use crate::protocol::{
    message::WlMessage,
    types::{ArgWriter, WlNewId, WlObject, WlUInt},
};

/// Represents the request types that can be sent to the Wayland registry object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WlRegistryRequest {
    /// Binds a new, client-created object to a numeric global name.
    Bind = 0,
}

impl From<WlRegistryRequest> for u16 {
    fn from(request: WlRegistryRequest) -> u16 {
        request as u16
    }
}

/// Parameters for the `wl_registry.bind` request.
///
/// The `id` argument is an untyped `new_id`, so the wire form spells out the
/// interface name and version in front of the id itself.
///
/// # Specification Reference
/// ```xml
/// <request name="bind">
///   <description summary="bind an object to the display">
///     Binds a new, client-created object to the server using the
///     specified name as the identifier.
///   </description>
///   <arg name="name" type="uint" summary="unique numeric name of the object"/>
///   <arg name="id" type="new_id" summary="bounded object"/>
/// </request>
/// ```
pub struct WlRegistryBindParam<'a> {
    /// Numeric name of the global, as announced by `wl_registry.global`.
    pub name: WlUInt,
    /// Interface the new object implements.
    pub interface: &'a str,
    /// Version to bind; never higher than the announced one.
    pub version: WlUInt,
    /// Client-allocated id of the new object.
    pub new_id: WlNewId,
}

impl From<WlRegistryBindParam<'_>> for Vec<u8> {
    /// # Wire Format
    /// - `name` (u32)
    /// - `interface` (WlString, padded)
    /// - `version` (u32)
    /// - `new_id` (u32)
    fn from(args: WlRegistryBindParam<'_>) -> Vec<u8> {
        ArgWriter::new()
            .uint(args.name)
            .string(args.interface)
            .uint(args.version)
            .new_id(args.new_id)
            .finish()
    }
}

/// Builds a `wl_registry.bind` request sent to `registry`.
pub fn bind(registry: WlObject, param: WlRegistryBindParam<'_>) -> anyhow::Result<WlMessage> {
    WlMessage::new(registry, WlRegistryRequest::Bind.into(), param.into())
}
