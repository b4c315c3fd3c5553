use std::io;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while driving a connection.
///
/// Only [`Error::UnknownObject`] and [`Error::UnexpectedOpcode`] are
/// recoverable; the dispatch loop logs them and reads the next message.
/// Every other variant ends the session.
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport failure: {0}")]
    Transport(#[from] io::Error),

    #[error("protocol error on {interface}@{object_id} (code {code}): {message}")]
    Protocol {
        object_id: u32,
        interface: &'static str,
        code: u32,
        message: String,
    },

    #[error("object id space exhausted")]
    CapacityExhausted,

    #[error("shared memory setup failed: {0}")]
    SharedMemory(#[source] io::Error),

    #[error("compositor does not advertise required global {0}")]
    MissingGlobal(&'static str),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("event for unknown object {object_id} (opcode {opcode})")]
    UnknownObject { object_id: u32, opcode: u16 },

    #[error("unexpected opcode {opcode} on {interface}@{object_id}")]
    UnexpectedOpcode {
        object_id: u32,
        interface: &'static str,
        opcode: u16,
    },
}

impl Error {
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::UnknownObject { .. } | Error::UnexpectedOpcode { .. }
        )
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Codec(format!("{err:#}"))
    }
}
