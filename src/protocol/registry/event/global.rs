use std::fmt::Display;

use crate::protocol::types::{ArgReader, WlString, WlUInt};

/// Represents a global object advertisement from the Wayland registry.
///
/// # Specification Reference
/// ```xml
/// <event name="global">
///   <description summary="announce global object">
///     Notify the client of global objects.
///     The event notifies the client that a global object with
///     the given name is now available, and it implements the
///     given version of the given interface.
///   </description>
///   <arg name="name" type="uint" summary="numeric name of the global object"/>
///   <arg name="interface" type="string" summary="interface implemented by the object"/>
///   <arg name="version" type="uint" summary="interface version"/>
/// </event>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Global {
    /// The unique numeric identifier for this global object.
    ///
    /// This name is used when binding to the global object via the `bind` request.
    pub name: WlUInt,

    /// The interface type implemented by this global object, e.g. "wl_compositor".
    pub interface: WlString,

    /// The highest version of the interface the compositor implements.
    pub version: WlUInt,
}

impl Global {
    pub fn interface_name(&self) -> String {
        String::from(&self.interface)
    }
}

impl TryFrom<&[u8]> for Global {
    type Error = anyhow::Error;

    /// Deserializes a `wl_registry.global` event from the Wayland wire format.
    ///
    /// # Buffer Layout
    /// - Bytes 0-3: `name` (u32) - Unique numeric identifier for the global
    /// - Bytes 4+: `interface` (WlString) - Interface type name with length prefix
    /// - Next 4 bytes after the padded interface: `version` (u32)
    ///
    /// # Errors
    /// Returns an error if:
    /// - Buffer is too short for any of the three fields
    /// - The interface string is missing its NUL terminator
    fn try_from(buf: &[u8]) -> anyhow::Result<Global> {
        let mut reader = ArgReader::new(buf);

        Ok(Global {
            name: reader.uint()?,
            interface: reader.string()?,
            version: reader.uint()?,
        })
    }
}

impl Display for Global {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WlRegistryGlobal {{ name: {}, interface: {}, version: {} }}",
            self.name, self.interface, self.version
        )
    }
}
