use crate::protocol::types::{ArgReader, WlUInt};

/// Payload of `wl_registry.global_remove`.
///
/// # Specification Reference
/// ```xml
/// <event name="global_remove">
///   <arg name="name" type="uint" summary="numeric name of the global object"/>
/// </event>
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalRemove {
    pub name: WlUInt,
}

impl TryFrom<&[u8]> for GlobalRemove {
    type Error = anyhow::Error;

    fn try_from(buf: &[u8]) -> anyhow::Result<GlobalRemove> {
        let name = ArgReader::new(buf).uint()?;
        Ok(GlobalRemove { name })
    }
}
