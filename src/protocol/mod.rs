//! Hand-written encoders and decoders for the interfaces this client speaks.
//!
//! Every request is built as a [`message::WlMessage`] by a function in the
//! interface's module; every event is decoded through [`DecodeEvent`].

pub mod buffer;
pub mod callback;
pub mod compositor;
pub mod display;
pub mod layer_shell;
pub mod macros;
pub mod message;
pub mod output;
pub mod registry;
pub mod shm;
pub mod surface;
pub mod types;
pub mod xdg_shell;

use std::fmt::{self, Display, Formatter};

/// Id of the `wl_display` singleton, fixed by the protocol.
pub const WL_DISPLAY_ID: u32 = 1;

/// Id this client always assigns to its `wl_registry` in `get_registry`.
pub const WL_REGISTRY_ID: u32 = 2;

/// Interface of a live object, as tracked by the object table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Display,
    Registry,
    Callback,
    Compositor,
    Shm,
    ShmPool,
    Buffer,
    Surface,
    Output,
    XdgWmBase,
    XdgSurface,
    XdgToplevel,
    LayerShell,
    LayerSurface,
}

impl ObjectType {
    /// The protocol interface name, as it appears in `wl_registry.global`.
    pub fn interface(self) -> &'static str {
        match self {
            ObjectType::Display => display::INTERFACE,
            ObjectType::Registry => registry::INTERFACE,
            ObjectType::Callback => callback::INTERFACE,
            ObjectType::Compositor => compositor::INTERFACE,
            ObjectType::Shm => shm::INTERFACE,
            ObjectType::ShmPool => shm::POOL_INTERFACE,
            ObjectType::Buffer => buffer::INTERFACE,
            ObjectType::Surface => surface::INTERFACE,
            ObjectType::Output => output::INTERFACE,
            ObjectType::XdgWmBase => xdg_shell::WM_BASE_INTERFACE,
            ObjectType::XdgSurface => xdg_shell::SURFACE_INTERFACE,
            ObjectType::XdgToplevel => xdg_shell::TOPLEVEL_INTERFACE,
            ObjectType::LayerShell => layer_shell::INTERFACE,
            ObjectType::LayerSurface => layer_shell::SURFACE_INTERFACE,
        }
    }
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.interface())
    }
}

/// Decoding of one interface's events from an opcode and a message body.
pub trait DecodeEvent: Sized {
    /// Returns `Ok(None)` when the interface defines no event for `opcode`.
    ///
    /// # Errors
    /// Returns an error if the opcode is known but the body is malformed.
    fn decode(opcode: u16, body: &[u8]) -> anyhow::Result<Option<Self>>;
}
