//! Global discovery and bind.
//!
//! Registry `global` events are matched against a fixed allowlist; every
//! match gets a fresh client id and a `wl_registry.bind` at the lower of the
//! advertised and the supported version.

use tracing::{debug, info, trace, warn};

use crate::{
    config::Role,
    error::{Error, Result},
    objects::ObjectMap,
    protocol::{
        ObjectType, WL_REGISTRY_ID, compositor, layer_shell, output,
        registry::{self, event::global::Global, request::WlRegistryBindParam},
        shm, xdg_shell,
    },
    transport::Connection,
};

/// An interface this client knows how to drive, and the newest version it speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Supported {
    pub interface: &'static str,
    pub kind: ObjectType,
    pub version: u32,
}

pub const SUPPORTED: &[Supported] = &[
    Supported {
        interface: compositor::INTERFACE,
        kind: ObjectType::Compositor,
        version: 4,
    },
    Supported {
        interface: shm::INTERFACE,
        kind: ObjectType::Shm,
        version: 1,
    },
    Supported {
        interface: output::INTERFACE,
        kind: ObjectType::Output,
        version: 3,
    },
    Supported {
        interface: xdg_shell::WM_BASE_INTERFACE,
        kind: ObjectType::XdgWmBase,
        version: 5,
    },
    Supported {
        interface: layer_shell::INTERFACE,
        kind: ObjectType::LayerShell,
        version: 1,
    },
];

pub fn supported(interface: &str) -> Option<&'static Supported> {
    SUPPORTED.iter().find(|entry| entry.interface == interface)
}

/// A global this client has bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    /// Registry name of the global.
    pub name: u32,
    /// Client id of the bound object.
    pub id: u32,
    /// Negotiated version.
    pub version: u32,
}

/// Bound globals. Singletons keep the first advertisement; outputs keep all.
#[derive(Debug, Default)]
pub struct Globals {
    pub compositor: Option<Bound>,
    pub shm: Option<Bound>,
    pub wm_base: Option<Bound>,
    pub layer_shell: Option<Bound>,
    pub outputs: Vec<Bound>,
}

impl Globals {
    fn singleton(&self, kind: ObjectType) -> Option<Bound> {
        match kind {
            ObjectType::Compositor => self.compositor,
            ObjectType::Shm => self.shm,
            ObjectType::XdgWmBase => self.wm_base,
            ObjectType::LayerShell => self.layer_shell,
            _ => None,
        }
    }

    /// Binds `global` if it is on the allowlist.
    ///
    /// Returns the new binding, or `None` when the interface is not wanted or
    /// a singleton of that interface is already bound.
    pub fn bind(
        &mut self,
        global: &Global,
        conn: &mut Connection,
        objects: &mut ObjectMap,
    ) -> Result<Option<Bound>> {
        let interface = global.interface_name();
        let Some(supported) = supported(&interface) else {
            trace!(name = global.name, %interface, "skipping global");
            return Ok(None);
        };

        if let Some(existing) = self.singleton(supported.kind) {
            debug!(
                name = global.name,
                %interface,
                bound_name = existing.name,
                "singleton already bound, skipping"
            );
            return Ok(None);
        }

        let version = global.version.min(supported.version);
        let id = objects.allocate(supported.kind)?;
        conn.send(registry::bind(
            WL_REGISTRY_ID,
            WlRegistryBindParam {
                name: global.name,
                interface: supported.interface,
                version,
                new_id: id,
            },
        )?)?;

        let bound = Bound {
            name: global.name,
            id,
            version,
        };
        match supported.kind {
            ObjectType::Compositor => self.compositor = Some(bound),
            ObjectType::Shm => self.shm = Some(bound),
            ObjectType::XdgWmBase => self.wm_base = Some(bound),
            ObjectType::LayerShell => self.layer_shell = Some(bound),
            ObjectType::Output => self.outputs.push(bound),
            _ => {}
        }

        info!(
            name = global.name,
            interface = supported.interface,
            id,
            version,
            advertised = global.version,
            "bound global"
        );
        Ok(Some(bound))
    }

    /// Handles `wl_registry.global_remove`.
    ///
    /// Outputs are forgotten; losing a singleton is only reported, since the
    /// surface cannot outlive it anyway.
    pub fn remove(&mut self, name: u32) -> Option<Bound> {
        if let Some(index) = self.outputs.iter().position(|bound| bound.name == name) {
            let bound = self.outputs.remove(index);
            info!(name, id = bound.id, "output removed");
            return Some(bound);
        }

        let singleton = [self.compositor, self.shm, self.wm_base, self.layer_shell]
            .into_iter()
            .flatten()
            .find(|bound| bound.name == name);
        match singleton {
            Some(bound) => warn!(name, id = bound.id, "a bound global was removed"),
            None => debug!(name, "unbound global removed"),
        }
        singleton
    }

    /// Fails unless every global the surface role depends on is bound.
    pub fn require(&self, role: Role) -> Result<()> {
        if self.compositor.is_none() {
            return Err(Error::MissingGlobal(compositor::INTERFACE));
        }
        if self.shm.is_none() {
            return Err(Error::MissingGlobal(shm::INTERFACE));
        }
        match role {
            Role::Toplevel if self.wm_base.is_none() => {
                Err(Error::MissingGlobal(xdg_shell::WM_BASE_INTERFACE))
            }
            Role::Layer if self.layer_shell.is_none() => {
                Err(Error::MissingGlobal(layer_shell::INTERFACE))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::WlString;
    use std::{io::Read, os::unix::net::UnixStream};

    fn global(name: u32, interface: &str, version: u32) -> Global {
        Global {
            name,
            interface: WlString::from(interface),
            version,
        }
    }

    fn setup() -> (Connection, UnixStream, ObjectMap) {
        let (client, peer) = UnixStream::pair().unwrap();
        (Connection::from_stream(client), peer, ObjectMap::new())
    }

    #[test]
    fn binds_compositor_with_exact_wire_bytes() {
        let (mut conn, mut peer, mut objects) = setup();
        let mut globals = Globals::default();

        let bound = globals
            .bind(&global(5, "wl_compositor", 4), &mut conn, &mut objects)
            .unwrap()
            .unwrap();
        assert_eq!(bound, Bound { name: 5, id: 3, version: 4 });
        assert_eq!(objects.get(3), Some(ObjectType::Compositor));

        let mut raw = [0u8; 40];
        peer.read_exact(&mut raw).unwrap();
        let mut expected = Vec::new();
        for word in [2u32, 40 << 16, 5, 14] {
            expected.extend(word.to_le_bytes());
        }
        expected.extend(b"wl_compositor\0\0\0");
        expected.extend(4u32.to_le_bytes());
        expected.extend(3u32.to_le_bytes());
        assert_eq!(raw.to_vec(), expected);
    }

    #[test]
    fn version_is_capped_to_supported() {
        let (mut conn, _peer, mut objects) = setup();
        let mut globals = Globals::default();

        globals
            .bind(&global(1, "xdg_wm_base", 7), &mut conn, &mut objects)
            .unwrap();
        globals
            .bind(&global(2, "wl_shm", 2), &mut conn, &mut objects)
            .unwrap();
        globals
            .bind(&global(3, "wl_compositor", 3), &mut conn, &mut objects)
            .unwrap();

        assert_eq!(globals.wm_base.unwrap().version, 5);
        assert_eq!(globals.shm.unwrap().version, 1);
        assert_eq!(globals.compositor.unwrap().version, 3);
    }

    #[test]
    fn unmatched_and_duplicate_globals_are_skipped() {
        let (mut conn, _peer, mut objects) = setup();
        let mut globals = Globals::default();

        assert!(
            globals
                .bind(&global(1, "wp_viewporter", 1), &mut conn, &mut objects)
                .unwrap()
                .is_none()
        );
        globals
            .bind(&global(2, "wl_compositor", 6), &mut conn, &mut objects)
            .unwrap();
        assert!(
            globals
                .bind(&global(3, "wl_compositor", 6), &mut conn, &mut objects)
                .unwrap()
                .is_none()
        );

        assert_eq!(globals.compositor.unwrap().name, 2);
        assert_eq!(objects.live_count(), 3);
    }

    #[test]
    fn every_output_is_bound() {
        let (mut conn, _peer, mut objects) = setup();
        let mut globals = Globals::default();

        for name in [10, 11] {
            globals
                .bind(&global(name, "wl_output", 4), &mut conn, &mut objects)
                .unwrap();
        }
        assert_eq!(globals.outputs.len(), 2);
        assert!(globals.outputs.iter().all(|output| output.version == 3));

        assert_eq!(globals.remove(10).map(|bound| bound.name), Some(10));
        assert_eq!(globals.outputs.len(), 1);
        assert_eq!(globals.remove(99), None);
    }

    #[test]
    fn required_globals_depend_on_role() {
        let bound = |name| Some(Bound { name, id: name + 2, version: 1 });
        let mut globals = Globals::default();
        assert!(matches!(
            globals.require(Role::Toplevel),
            Err(Error::MissingGlobal("wl_compositor"))
        ));

        globals.compositor = bound(1);
        globals.shm = bound(2);
        assert!(matches!(
            globals.require(Role::Toplevel),
            Err(Error::MissingGlobal("xdg_wm_base"))
        ));
        assert!(matches!(
            globals.require(Role::Layer),
            Err(Error::MissingGlobal("zwlr_layer_shell_v1"))
        ));

        globals.wm_base = bound(3);
        assert!(globals.require(Role::Toplevel).is_ok());
    }
}
