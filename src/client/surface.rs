//! Surface lifecycle: role setup, buffer negotiation, configure/ack and the
//! redraw loop.

use std::{io, os::fd::AsFd};

use tracing::{debug, info, trace, warn};

use super::{Client, Flow, Phase};
use crate::{
    config::{RenderMode, Role},
    error::{Error, Result},
    protocol::{
        ObjectType, compositor,
        layer_shell::{self, GetLayerSurfaceParam, Layer},
        shm,
        surface::{self, DAMAGE_BUFFER_SINCE, Rect},
        xdg_shell::{self, ToplevelEvent, ToplevelState},
    },
    shm::ShmPool,
};

/// Ids of the objects that make up the role-bearing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceObjects {
    pub surface: u32,
    pub role: RoleObjects,
    pub pool: u32,
    pub buffer: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleObjects {
    Toplevel { xdg_surface: u32, toplevel: u32 },
    Layer { layer_surface: u32 },
}

impl Client {
    /// Creates the surface, gives it a role, negotiates its buffer and
    /// starts the round-trip that ends surface setup.
    pub(super) fn setup_surface(&mut self) -> Result<()> {
        let compositor = self
            .globals
            .compositor
            .ok_or(Error::MissingGlobal(compositor::INTERFACE))?;
        let surface = self.objects.allocate(ObjectType::Surface)?;
        self.conn
            .send(compositor::create_surface(compositor.id, surface)?)?;

        let role = match self.config.role {
            Role::Toplevel => self.assign_toplevel(surface)?,
            Role::Layer => self.assign_layer(surface)?,
        };
        let (pool, buffer) = self.negotiate_buffer()?;

        self.surface = Some(SurfaceObjects {
            surface,
            role,
            pool,
            buffer,
        });
        self.roundtrip()?;
        self.enter(Phase::SurfaceInit);
        Ok(())
    }

    fn assign_toplevel(&mut self, surface: u32) -> Result<RoleObjects> {
        let wm_base = self
            .globals
            .wm_base
            .ok_or(Error::MissingGlobal(xdg_shell::WM_BASE_INTERFACE))?;

        let xdg_surface = self.objects.allocate(ObjectType::XdgSurface)?;
        self.conn
            .send(xdg_shell::get_xdg_surface(wm_base.id, xdg_surface, surface)?)?;
        let toplevel = self.objects.allocate(ObjectType::XdgToplevel)?;
        self.conn
            .send(xdg_shell::get_toplevel(xdg_surface, toplevel)?)?;

        self.conn
            .send(xdg_shell::set_title(toplevel, &self.config.title)?)?;
        self.conn
            .send(xdg_shell::set_app_id(toplevel, &self.config.app_id)?)?;

        debug!(surface, xdg_surface, toplevel, "toplevel role assigned");
        Ok(RoleObjects::Toplevel {
            xdg_surface,
            toplevel,
        })
    }

    fn assign_layer(&mut self, surface: u32) -> Result<RoleObjects> {
        let layer_shell = self
            .globals
            .layer_shell
            .ok_or(Error::MissingGlobal(layer_shell::INTERFACE))?;

        let layer_surface = self.objects.allocate(ObjectType::LayerSurface)?;
        self.conn.send(layer_shell::get_layer_surface(
            layer_shell.id,
            GetLayerSurfaceParam {
                new_id: layer_surface,
                surface,
                output: None,
                layer: Layer::Top,
                namespace: &self.config.namespace,
            },
        )?)?;
        self.conn.send(layer_shell::set_size(
            layer_surface,
            self.config.width,
            self.config.height,
        )?)?;

        debug!(surface, layer_surface, "layer role assigned");
        Ok(RoleObjects::Layer { layer_surface })
    }

    /// Maps the backing store, passes it to the compositor as a pool and
    /// carves the one buffer out of it.
    fn negotiate_buffer(&mut self) -> Result<(u32, u32)> {
        let shm_global = self
            .globals
            .shm
            .ok_or(Error::MissingGlobal(shm::INTERFACE))?;

        let format = u32::from(self.layout.format);
        if !self.shm_formats.contains(&format) {
            warn!(
                format = %self.layout.format,
                advertised = ?self.shm_formats,
                "pixel format was not advertised by the compositor"
            );
        }

        let size = self.layout.size_bytes();
        let pool_size = i32::try_from(size).map_err(|_| {
            Error::SharedMemory(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("pool of {size} bytes exceeds the protocol limit"),
            ))
        })?;
        let backing = ShmPool::create(size)?;

        let pool = self.objects.allocate(ObjectType::ShmPool)?;
        self.conn.send_with_fd(
            shm::create_pool(shm_global.id, pool, pool_size)?,
            backing.as_fd(),
        )?;

        let buffer = self.objects.allocate(ObjectType::Buffer)?;
        self.conn.send(shm::create_buffer(
            pool,
            self.layout.create_buffer_param(buffer),
        )?)?;

        info!(
            pool,
            buffer,
            size,
            width = self.layout.width,
            height = self.layout.height,
            stride = self.layout.stride,
            "shared buffer ready"
        );
        self.pool = Some(backing);
        Ok((pool, buffer))
    }

    /// Commits the role state so the compositor sends the first configure.
    ///
    /// No buffer may be attached before that configure is acked, so this
    /// commit carries only the frame callback request.
    pub(super) fn initial_commit(&mut self) -> Result<()> {
        let Some(objects) = self.surface else {
            warn!("initial commit without a surface");
            return Ok(());
        };

        if self.config.mode == RenderMode::Frame {
            self.request_frame(objects.surface)?;
        }
        self.conn.send(surface::commit(objects.surface)?)?;
        self.enter(Phase::ConfigureWait);
        Ok(())
    }

    pub(super) fn on_ping(&mut self, serial: u32) -> Result<Flow> {
        let wm_base = self
            .globals
            .wm_base
            .ok_or(Error::MissingGlobal(xdg_shell::WM_BASE_INTERFACE))?;
        self.conn.send(xdg_shell::pong(wm_base.id, serial)?)?;
        trace!(serial, "pong");
        Ok(Flow::Continue)
    }

    pub(super) fn on_xdg_configure(&mut self, serial: u32) -> Result<Flow> {
        let Some(SurfaceObjects {
            role: RoleObjects::Toplevel { xdg_surface, .. },
            ..
        }) = self.surface
        else {
            warn!(serial, "xdg_surface configure without a toplevel");
            return Ok(Flow::Continue);
        };

        self.conn
            .send(xdg_shell::ack_configure(xdg_surface, serial)?)?;
        self.after_ack(serial)
    }

    pub(super) fn on_toplevel_event(&mut self, event: ToplevelEvent) -> Result<Flow> {
        match event {
            ToplevelEvent::Configure {
                width,
                height,
                states,
            } => {
                let states: Vec<String> = states
                    .into_iter()
                    .map(|state| match ToplevelState::try_from(state) {
                        Ok(state) => state.to_string(),
                        Err(_) => format!("unknown({state})"),
                    })
                    .collect();
                debug!(width, height, ?states, "toplevel configure");
                Ok(Flow::Continue)
            }
            ToplevelEvent::Close => {
                info!("compositor asked to close the toplevel");
                Ok(Flow::Exit)
            }
            ToplevelEvent::ConfigureBounds { width, height } => {
                debug!(width, height, "toplevel bounds");
                Ok(Flow::Continue)
            }
            ToplevelEvent::WmCapabilities { capabilities } => {
                debug!(?capabilities, "window manager capabilities");
                Ok(Flow::Continue)
            }
        }
    }

    pub(super) fn on_layer_event(&mut self, event: layer_shell::SurfaceEvent) -> Result<Flow> {
        match event {
            layer_shell::SurfaceEvent::Configure {
                serial,
                width,
                height,
            } => {
                let Some(SurfaceObjects {
                    role: RoleObjects::Layer { layer_surface },
                    ..
                }) = self.surface
                else {
                    warn!(serial, "layer configure without a layer surface");
                    return Ok(Flow::Continue);
                };

                debug!(serial, width, height, "layer surface configure");
                self.conn
                    .send(layer_shell::ack_configure(layer_surface, serial)?)?;
                self.after_ack(serial)
            }
            layer_shell::SurfaceEvent::Closed => {
                info!("compositor closed the layer surface");
                Ok(Flow::Exit)
            }
        }
    }

    /// Content follows the first ack, and every ack in configure mode.
    fn after_ack(&mut self, serial: u32) -> Result<Flow> {
        let first = !self.configured;
        self.configured = true;
        if first {
            debug!(serial, "first configure acked");
            self.enter(Phase::SteadyState);
        }

        if first || self.config.mode == RenderMode::Configure {
            self.redraw()?;
        }
        Ok(Flow::Continue)
    }

    pub(super) fn on_frame_done(&mut self) -> Result<Flow> {
        let Some(objects) = self.surface else {
            return Ok(Flow::Continue);
        };

        // Re-arm before drawing so the surface is never left without a pending frame.
        self.request_frame(objects.surface)?;
        if self.configured {
            self.redraw()?;
        }
        Ok(Flow::Continue)
    }

    fn request_frame(&mut self, surface: u32) -> Result<()> {
        let callback = self.objects.allocate(ObjectType::Callback)?;
        self.conn.send(surface::frame(surface, callback)?)?;
        self.frame_callback = Some(callback);
        Ok(())
    }

    /// Paints the shared buffer and commits it with full damage.
    fn redraw(&mut self) -> Result<()> {
        let Some(objects) = self.surface else {
            return Ok(());
        };

        if let Some(pool) = self.pool.as_mut() {
            self.painter.paint(pool.buffer_mut(&self.layout));
        }

        let rect = Rect {
            x: 0,
            y: 0,
            width: self.layout.width as i32,
            height: self.layout.height as i32,
        };
        let damage = match self.globals.compositor {
            Some(compositor) if compositor.version >= DAMAGE_BUFFER_SINCE => {
                surface::damage_buffer(objects.surface, rect)?
            }
            _ => surface::damage(objects.surface, rect)?,
        };

        self.conn
            .send(surface::attach(objects.surface, objects.buffer, 0, 0)?)?;
        self.conn.send(damage)?;
        self.conn.send(surface::commit(objects.surface)?)?;
        trace!(surface = objects.surface, buffer = objects.buffer, "committed frame");
        Ok(())
    }
}
