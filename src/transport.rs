//! Framed message transport over the compositor's Unix socket.

use std::{
    io::{IoSlice, Read, Write},
    os::{
        fd::{AsFd, BorrowedFd},
        unix::net::UnixStream,
    },
    path::Path,
};

use rustix::net::{SendAncillaryBuffer, SendAncillaryMessage, SendFlags, sendmsg};
use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    protocol::message::{WL_MESSAGE_HEADER_LEN, WlMessage, WlMessageHeader},
};

/// A blocking, duplex connection to the compositor.
///
/// Reads block until a whole message is available. Every write puts a
/// complete message on the socket before returning; nothing is buffered
/// across calls.
pub struct Connection {
    stream: UnixStream,
}

impl Connection {
    /// Connects to the compositor listening at `path`.
    pub fn connect(path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(path)?;
        // Reads block indefinitely; the compositor drives the pace.
        stream.set_read_timeout(None)?;
        debug!(path = %path.display(), "connected to compositor");
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: UnixStream) -> Self {
        Self { stream }
    }

    /// Reads exactly one message: the header, then exactly the body length it declares.
    pub fn read_message(&mut self) -> Result<WlMessage> {
        let mut header_buf = [0u8; WL_MESSAGE_HEADER_LEN];
        self.stream.read_exact(&mut header_buf)?;
        let header = WlMessageHeader::try_from(&header_buf[..])?;

        let mut data = vec![0u8; header.body_len()];
        self.stream.read_exact(&mut data)?;

        let msg = WlMessage { header, data };
        trace!(
            object_id = msg.object_id(),
            opcode = msg.opcode(),
            size = msg.header.size,
            "<- event"
        );
        Ok(msg)
    }

    /// Writes one complete message.
    pub fn send(&mut self, msg: WlMessage) -> Result<()> {
        trace!(
            object_id = msg.object_id(),
            opcode = msg.opcode(),
            size = msg.header.size,
            "-> request"
        );
        let raw: Vec<u8> = msg.into();
        self.stream.write_all(&raw)?;
        Ok(())
    }

    /// Writes one complete message with `fd` attached as `SCM_RIGHTS` ancillary data.
    ///
    /// The descriptor rides on the first chunk the kernel accepts; any
    /// remainder of a short write goes out as plain bytes.
    pub fn send_with_fd(&mut self, msg: WlMessage, fd: BorrowedFd<'_>) -> Result<()> {
        trace!(
            object_id = msg.object_id(),
            opcode = msg.opcode(),
            size = msg.header.size,
            fd = ?fd,
            "-> request with fd"
        );
        let raw: Vec<u8> = msg.into();

        let fds = [fd];
        let mut space = [0u8; rustix::cmsg_space!(ScmRights(1))];
        let mut control = SendAncillaryBuffer::new(&mut space);
        if !control.push(SendAncillaryMessage::ScmRights(&fds)) {
            return Err(Error::Transport(std::io::Error::other(
                "ancillary buffer too small for one descriptor",
            )));
        }

        let sent = sendmsg(
            self.stream.as_fd(),
            &[IoSlice::new(&raw)],
            &mut control,
            SendFlags::empty(),
        )
        .map_err(std::io::Error::from)?;

        if sent < raw.len() {
            self.stream.write_all(&raw[sent..])?;
        }
        Ok(())
    }
}
