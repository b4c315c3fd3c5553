//! A Wayland client written against the raw wire protocol: it opens one
//! window backed by a shared-memory buffer and redraws it until closed.

pub mod client;
pub mod config;
pub mod error;
pub mod objects;
pub mod paint;
pub mod protocol;
pub mod shm;
pub mod transport;

pub use client::Client;
pub use error::{Error, Result};
