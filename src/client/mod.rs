//! The protocol engine: one connection, one surface, one read loop.
//!
//! [`Client::run`] reads a message, decodes it against the interface of its
//! target object and hands the typed event to the state machine. Routing
//! misses (stale ids, opcodes nobody defined) are logged and skipped; every
//! other error ends the session.

pub mod globals;
pub mod surface;

use std::fmt::{self, Display, Formatter};

use tracing::{debug, info, trace, warn};

use crate::{
    config::SurfaceConfig,
    error::{Error, Result},
    objects::ObjectMap,
    paint::Painter,
    protocol::{
        DecodeEvent, ObjectType, WL_REGISTRY_ID, buffer, callback, display,
        layer_shell, message::WlMessage, output, registry, shm, surface as wl_surface,
        xdg_shell,
    },
    shm::{BufferLayout, ShmPool},
    transport::Connection,
};

use self::{globals::Globals, surface::SurfaceObjects};

/// Where the surface lifecycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Collecting registry globals until the first sync callback fires.
    Bootstrap,
    /// Surface, role and buffer requested; waiting on the second sync.
    SurfaceInit,
    /// Initial commit sent; waiting for the first configure.
    ConfigureWait,
    /// Configured and redrawing.
    SteadyState,
    /// Terminal. No further requests are sent.
    Shutdown,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Bootstrap => "bootstrap",
            Phase::SurfaceInit => "surface-init",
            Phase::ConfigureWait => "configure-wait",
            Phase::SteadyState => "steady-state",
            Phase::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

/// Whether the read loop keeps going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// An event decoded against the interface of the object it targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Display(display::Event),
    Registry(registry::Event),
    Callback { id: u32, event: callback::Event },
    Shm(shm::Event),
    Buffer(buffer::Event),
    Surface(wl_surface::Event),
    Output { id: u32, event: output::Event },
    WmBase(xdg_shell::WmBaseEvent),
    XdgSurface(xdg_shell::SurfaceEvent),
    Toplevel(xdg_shell::ToplevelEvent),
    LayerSurface(layer_shell::SurfaceEvent),
}

fn decode_as<E: DecodeEvent>(msg: &WlMessage, kind: ObjectType) -> Result<E> {
    E::decode(msg.opcode(), &msg.data)?.ok_or(Error::UnexpectedOpcode {
        object_id: msg.object_id(),
        interface: kind.interface(),
        opcode: msg.opcode(),
    })
}

impl Incoming {
    /// Decodes `msg`, which targets a live object of type `kind`.
    ///
    /// # Errors
    /// [`Error::UnexpectedOpcode`] when the interface has no such event (or
    /// no events at all), [`Error::Codec`] when the body is malformed.
    pub fn decode(msg: &WlMessage, kind: ObjectType) -> Result<Incoming> {
        let id = msg.object_id();
        let incoming = match kind {
            ObjectType::Display => Incoming::Display(decode_as(msg, kind)?),
            ObjectType::Registry => Incoming::Registry(decode_as(msg, kind)?),
            ObjectType::Callback => Incoming::Callback {
                id,
                event: decode_as(msg, kind)?,
            },
            ObjectType::Shm => Incoming::Shm(decode_as(msg, kind)?),
            ObjectType::Buffer => Incoming::Buffer(decode_as(msg, kind)?),
            ObjectType::Surface => Incoming::Surface(decode_as(msg, kind)?),
            ObjectType::Output => Incoming::Output {
                id,
                event: decode_as(msg, kind)?,
            },
            ObjectType::XdgWmBase => Incoming::WmBase(decode_as(msg, kind)?),
            ObjectType::XdgSurface => Incoming::XdgSurface(decode_as(msg, kind)?),
            ObjectType::XdgToplevel => Incoming::Toplevel(decode_as(msg, kind)?),
            ObjectType::LayerSurface => Incoming::LayerSurface(decode_as(msg, kind)?),
            ObjectType::Compositor | ObjectType::ShmPool | ObjectType::LayerShell => {
                return Err(Error::UnexpectedOpcode {
                    object_id: id,
                    interface: kind.interface(),
                    opcode: msg.opcode(),
                });
            }
        };
        Ok(incoming)
    }
}

/// A single-surface Wayland client.
pub struct Client {
    conn: Connection,
    objects: ObjectMap,
    config: SurfaceConfig,
    painter: Box<dyn Painter>,
    globals: Globals,
    phase: Phase,
    layout: BufferLayout,
    pool: Option<ShmPool>,
    surface: Option<SurfaceObjects>,
    /// Pending `wl_display.sync` round-trip, if any.
    sync_callback: Option<u32>,
    /// Pending `wl_surface.frame` callback, if any.
    frame_callback: Option<u32>,
    configured: bool,
    shm_formats: Vec<u32>,
}

impl Client {
    pub fn new(conn: Connection, config: SurfaceConfig, painter: Box<dyn Painter>) -> Self {
        let layout = BufferLayout::packed(config.width, config.height, config.format);
        Self {
            conn,
            objects: ObjectMap::new(),
            config,
            painter,
            globals: Globals::default(),
            phase: Phase::Bootstrap,
            layout,
            pool: None,
            surface: None,
            sync_callback: None,
            frame_callback: None,
            configured: false,
            shm_formats: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn objects(&self) -> &ObjectMap {
        &self.objects
    }

    /// Runs the session to completion.
    ///
    /// Returns `Ok(())` once the compositor closes the surface, or the first
    /// fatal error.
    pub fn run(&mut self) -> Result<()> {
        self.bootstrap()?;

        loop {
            let msg = self.conn.read_message()?;
            match self.dispatch(msg) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(err) if !err.is_fatal() => warn!(%err, "ignoring event"),
                Err(err) => return Err(err),
            }
        }

        self.enter(Phase::Shutdown);
        Ok(())
    }

    /// Requests the registry and the sync that marks the end of its initial burst.
    pub fn bootstrap(&mut self) -> Result<()> {
        self.conn.send(display::get_registry(WL_REGISTRY_ID)?)?;
        let sync = self.objects.allocate(ObjectType::Callback)?;
        self.conn.send(display::sync(sync)?)?;
        self.sync_callback = Some(sync);
        self.enter(Phase::Bootstrap);
        Ok(())
    }

    /// Routes one message by its target id and applies it.
    pub fn dispatch(&mut self, msg: WlMessage) -> Result<Flow> {
        let Some(kind) = self.objects.get(msg.object_id()) else {
            return Err(Error::UnknownObject {
                object_id: msg.object_id(),
                opcode: msg.opcode(),
            });
        };

        let incoming = Incoming::decode(&msg, kind)?;
        trace!(object_id = msg.object_id(), interface = %kind, event = ?incoming, "dispatch");
        self.handle(incoming)
    }

    /// Applies one decoded event to the state machine.
    pub fn handle(&mut self, incoming: Incoming) -> Result<Flow> {
        match incoming {
            Incoming::Display(display::Event::Error(err)) => Err(Error::Protocol {
                object_id: err.object_id,
                interface: self
                    .objects
                    .get(err.object_id)
                    .map_or("unknown", ObjectType::interface),
                code: err.code,
                message: String::from(&err.message),
            }),
            Incoming::Display(display::Event::DeleteId(deleted)) => {
                self.objects.free(deleted.id);
                Ok(Flow::Continue)
            }
            Incoming::Registry(registry::Event::Global(global)) => {
                if self.phase != Phase::Bootstrap {
                    debug!(%global, "global announced after discovery");
                }
                self.globals
                    .bind(&global, &mut self.conn, &mut self.objects)?;
                Ok(Flow::Continue)
            }
            Incoming::Registry(registry::Event::GlobalRemove(removed)) => {
                self.globals.remove(removed.name);
                Ok(Flow::Continue)
            }
            Incoming::Callback {
                id,
                event: callback::Event::Done { callback_data },
            } => self.on_callback_done(id, callback_data),
            Incoming::Shm(shm::Event::Format { format }) => {
                trace!(format = format_args!("{format:#010x}"), "shm format advertised");
                self.shm_formats.push(format);
                Ok(Flow::Continue)
            }
            Incoming::Buffer(buffer::Event::Release) => {
                trace!("buffer released by compositor");
                Ok(Flow::Continue)
            }
            Incoming::Surface(event) => {
                debug!(?event, "surface event");
                Ok(Flow::Continue)
            }
            Incoming::Output { id, event } => {
                debug!(output = id, ?event, "output event");
                Ok(Flow::Continue)
            }
            Incoming::WmBase(xdg_shell::WmBaseEvent::Ping { serial }) => self.on_ping(serial),
            Incoming::XdgSurface(xdg_shell::SurfaceEvent::Configure { serial }) => {
                self.on_xdg_configure(serial)
            }
            Incoming::Toplevel(event) => self.on_toplevel_event(event),
            Incoming::LayerSurface(event) => self.on_layer_event(event),
        }
    }

    fn on_callback_done(&mut self, id: u32, callback_data: u32) -> Result<Flow> {
        // The slot itself is released by the delete_id that follows.
        if self.sync_callback == Some(id) {
            self.sync_callback = None;
            debug!(id, serial = callback_data, phase = %self.phase, "sync done");
            self.on_sync_done()
        } else if self.frame_callback == Some(id) {
            self.frame_callback = None;
            trace!(id, time = callback_data, "frame done");
            self.on_frame_done()
        } else {
            debug!(id, "done for an untracked callback");
            Ok(Flow::Continue)
        }
    }

    fn on_sync_done(&mut self) -> Result<Flow> {
        match self.phase {
            Phase::Bootstrap => {
                self.globals.require(self.config.role)?;
                self.setup_surface()?;
            }
            Phase::SurfaceInit => self.initial_commit()?,
            _ => debug!(phase = %self.phase, "sync done outside of setup"),
        }
        Ok(Flow::Continue)
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            info!(from = %self.phase, to = %phase, "phase change");
        }
        self.phase = phase;
    }

    /// Allocates a callback and sends `wl_display.sync` on it.
    fn roundtrip(&mut self) -> Result<()> {
        let sync = self.objects.allocate(ObjectType::Callback)?;
        self.conn.send(display::sync(sync)?)?;
        self.sync_callback = Some(sync);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{
        io::{ErrorKind, Read},
        os::unix::net::UnixStream,
    };

    use super::*;
    use crate::{
        config::SurfaceConfig,
        paint::Invert,
        protocol::{WL_DISPLAY_ID, message::WL_MESSAGE_HEADER_LEN, types::ArgWriter},
    };

    /// A client wired to an in-memory peer that plays the compositor.
    pub struct Harness {
        pub client: Client,
        peer: UnixStream,
        next_name: u32,
    }

    impl Harness {
        pub fn new(config: SurfaceConfig) -> Self {
            let (client, peer) = UnixStream::pair().unwrap();
            peer.set_nonblocking(true).unwrap();
            Self {
                client: Client::new(Connection::from_stream(client), config, Box::new(Invert)),
                peer,
                next_name: 1,
            }
        }

        /// Delivers one event to the client.
        pub fn event(&mut self, object_id: u32, opcode: u16, body: Vec<u8>) -> Result<Flow> {
            let msg = WlMessage::new(object_id, opcode, body).unwrap();
            self.client.dispatch(msg)
        }

        /// Every request the client has written since the last drain.
        pub fn drain(&mut self) -> Vec<WlMessage> {
            let mut raw = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                match self.peer.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => raw.extend_from_slice(&chunk[..n]),
                    Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                    Err(err) => panic!("peer read failed: {err}"),
                }
            }

            let mut messages = Vec::new();
            let mut rest = &raw[..];
            while rest.len() >= WL_MESSAGE_HEADER_LEN {
                let msg = WlMessage::try_from(rest).unwrap();
                rest = &rest[msg.header.message_len()..];
                messages.push(msg);
            }
            messages
        }

        pub fn announce(&mut self, interface: &str, version: u32) {
            let body = ArgWriter::new()
                .uint(self.next_name)
                .string(interface)
                .uint(version)
                .finish();
            self.next_name += 1;
            self.event(WL_REGISTRY_ID, 0, body).unwrap();
        }

        pub fn callback_done(&mut self, id: u32) -> Result<Flow> {
            self.event(id, 0, ArgWriter::new().uint(0).finish())
        }

        pub fn delete_id(&mut self, id: u32) {
            self.event(WL_DISPLAY_ID, 1, ArgWriter::new().uint(id).finish())
                .unwrap();
        }

        /// Completes the pending sync round-trip the way a compositor does.
        pub fn finish_sync(&mut self) {
            let sync = self.client.sync_callback.unwrap();
            self.callback_done(sync).unwrap();
            self.delete_id(sync);
        }

        /// Drives the client up to the point where it waits for the first configure.
        pub fn up_to_configure_wait(config: SurfaceConfig) -> Self {
            let mut harness = Self::new(config);
            harness.client.bootstrap().unwrap();
            harness.announce("wl_compositor", 6);
            harness.announce("wl_shm", 1);
            harness.announce("xdg_wm_base", 6);
            harness.announce("zwlr_layer_shell_v1", 4);
            harness.finish_sync();
            harness.finish_sync();
            assert_eq!(harness.client.phase(), Phase::ConfigureWait);
            harness.drain();
            harness
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{testing::Harness, *};
    use crate::protocol::{WL_DISPLAY_ID, types::ArgWriter};

    #[test]
    fn bootstrap_requests_registry_then_sync() {
        let mut harness = Harness::new(SurfaceConfig::default());
        harness.client.bootstrap().unwrap();

        let sent = harness.drain();
        assert_eq!(sent.len(), 2);
        assert_eq!((sent[0].object_id(), sent[0].opcode()), (WL_DISPLAY_ID, 1));
        assert_eq!(sent[0].data, WL_REGISTRY_ID.to_le_bytes().to_vec());
        assert_eq!((sent[1].object_id(), sent[1].opcode()), (WL_DISPLAY_ID, 0));
        assert_eq!(sent[1].data, 3u32.to_le_bytes().to_vec());
        assert_eq!(harness.client.phase(), Phase::Bootstrap);
    }

    #[test]
    fn delete_id_frees_sync_callback_for_reuse() {
        let mut harness = Harness::new(SurfaceConfig::default());
        harness.client.bootstrap().unwrap();
        assert!(harness.client.objects().is_live(3));

        harness.delete_id(3);
        assert!(!harness.client.objects().is_live(3));
        assert_eq!(
            harness.client.objects.allocate(ObjectType::Callback).unwrap(),
            3
        );
    }

    #[test]
    fn unknown_object_is_recoverable() {
        let mut harness = Harness::new(SurfaceConfig::default());
        let err = harness.event(77, 0, Vec::new()).unwrap_err();

        assert!(matches!(
            err,
            Error::UnknownObject {
                object_id: 77,
                opcode: 0
            }
        ));
        assert!(!err.is_fatal());
    }

    #[test]
    fn unexpected_opcode_is_recoverable() {
        let mut harness = Harness::new(SurfaceConfig::default());
        let err = harness.event(WL_REGISTRY_ID, 9, Vec::new()).unwrap_err();

        assert!(matches!(
            err,
            Error::UnexpectedOpcode {
                interface: "wl_registry",
                opcode: 9,
                ..
            }
        ));
        assert!(!err.is_fatal());
    }

    #[test]
    fn display_error_is_fatal_and_names_the_interface() {
        let mut harness = Harness::new(SurfaceConfig::default());
        let body = ArgWriter::new()
            .object(WL_REGISTRY_ID)
            .uint(1)
            .string("invalid method")
            .finish();

        let err = harness.event(WL_DISPLAY_ID, 0, body).unwrap_err();
        match &err {
            Error::Protocol {
                object_id,
                interface,
                code,
                message,
            } => {
                assert_eq!(*object_id, WL_REGISTRY_ID);
                assert_eq!(*interface, "wl_registry");
                assert_eq!(*code, 1);
                assert_eq!(message, "invalid method");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.is_fatal());
    }

    #[test]
    fn missing_shell_fails_discovery() {
        let mut harness = Harness::new(SurfaceConfig::default());
        harness.client.bootstrap().unwrap();
        harness.announce("wl_compositor", 4);
        harness.announce("wl_shm", 1);

        let err = harness.callback_done(3).unwrap_err();
        assert!(matches!(err, Error::MissingGlobal("xdg_wm_base")));
    }

    #[test]
    fn discovery_binds_in_announcement_order() {
        let mut harness = Harness::new(SurfaceConfig::default());
        harness.client.bootstrap().unwrap();
        harness.drain();

        harness.announce("wl_seat", 9);
        harness.announce("wl_compositor", 4);
        harness.announce("wl_shm", 1);
        harness.announce("wl_output", 4);

        let binds = harness.drain();
        assert_eq!(binds.len(), 3);
        assert!(binds.iter().all(|msg| msg.object_id() == WL_REGISTRY_ID));
        let globals = harness.client.globals();
        assert_eq!(globals.compositor.map(|bound| bound.id), Some(4));
        assert_eq!(globals.shm.map(|bound| bound.id), Some(5));
        assert_eq!(globals.outputs[0].id, 6);
    }

    #[test]
    fn surface_init_creates_pool_and_buffer_then_syncs() {
        let mut harness = Harness::new(SurfaceConfig::default());
        harness.client.bootstrap().unwrap();
        harness.announce("wl_compositor", 4);
        harness.announce("wl_shm", 1);
        harness.announce("xdg_wm_base", 5);
        harness.drain();

        harness.finish_sync();
        assert_eq!(harness.client.phase(), Phase::SurfaceInit);

        let objects = harness.client.surface.unwrap();
        let shm = harness.client.globals().shm.unwrap().id;
        assert_eq!(harness.client.objects().get(objects.pool), Some(ObjectType::ShmPool));
        assert_eq!(harness.client.objects().get(objects.buffer), Some(ObjectType::Buffer));

        let sent = harness.drain();
        let create_pool = sent.iter().find(|msg| msg.object_id() == shm).unwrap();
        assert_eq!(create_pool.opcode(), 0);
        assert_eq!(
            create_pool.data,
            [objects.pool.to_le_bytes(), 40_000i32.to_le_bytes()].concat()
        );

        let create_buffer = sent
            .iter()
            .find(|msg| msg.object_id() == objects.pool)
            .unwrap();
        assert_eq!(create_buffer.opcode(), 0);
        assert_eq!(create_buffer.data[..4], objects.buffer.to_le_bytes());

        let last = sent.last().unwrap();
        assert_eq!((last.object_id(), last.opcode()), (WL_DISPLAY_ID, 0));
        assert!(harness.client.sync_callback.is_some());
    }

    #[test]
    fn run_ends_cleanly_on_close() {
        let (client, mut peer) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut client = Client::new(
            Connection::from_stream(client),
            SurfaceConfig::default(),
            Box::new(crate::paint::Invert),
        );

        // A stale id and an unknown opcode are skipped; the toplevel close is terminal.
        client.objects.allocate(ObjectType::Callback).unwrap();
        let toplevel = client.objects.allocate(ObjectType::XdgToplevel).unwrap();
        let mut script = Vec::new();
        for msg in [
            WlMessage::new(200, 0, Vec::new()).unwrap(),
            WlMessage::new(WL_REGISTRY_ID, 5, Vec::new()).unwrap(),
            WlMessage::new(toplevel, 1, Vec::new()).unwrap(),
        ] {
            script.extend(Vec::<u8>::from(msg));
        }
        std::io::Write::write_all(&mut peer, &script).unwrap();

        client.run().unwrap();
        assert_eq!(client.phase(), Phase::Shutdown);
    }
}
