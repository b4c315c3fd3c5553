use crate::protocol::types::{ArgReader, WlUInt};

/// Payload of `wl_display.delete_id`.
///
/// # Specification Reference
/// ```xml
/// <event name="delete_id">
///   <arg name="id" type="uint" summary="deleted object ID"/>
/// </event>
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteId {
    /// The object ID that may now be reused.
    pub id: WlUInt,
}

impl TryFrom<&[u8]> for DeleteId {
    type Error = anyhow::Error;

    fn try_from(buf: &[u8]) -> anyhow::Result<DeleteId> {
        let id = ArgReader::new(buf).uint()?;
        Ok(DeleteId { id })
    }
}
