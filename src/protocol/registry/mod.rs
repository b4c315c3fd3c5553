//! `wl_registry`: the global registry object.
//!
//! The registry advertises every global the compositor offers. Globals are
//! either actual server resources or singleton objects providing extension
//! functionality; a client binds the ones it needs to create local objects.

pub mod event;
pub mod request;

pub use event::Event;
pub use request::bind;

pub const INTERFACE: &str = "wl_registry";
