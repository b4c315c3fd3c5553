//! `wl_display`: the core global object.
//!
//! This is a special singleton object (always id 1) used for internal Wayland
//! protocol features: it hands out the registry, provides round-trip
//! synchronization via `sync`, reports fatal errors and acknowledges object
//! deletion so ids can be reused.

pub mod event;
pub mod request;

pub use event::Event;
pub use request::{get_registry, sync};

pub const INTERFACE: &str = "wl_display";
