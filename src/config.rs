//! Command line and environment configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{Parser, ValueEnum};

use crate::{paint::PaintMode, protocol::shm::Format};

/// Socket name used when `WAYLAND_DISPLAY` is unset.
pub const DEFAULT_DISPLAY: &str = "wayland-0";

/// Opens one window on a Wayland compositor and keeps redrawing a
/// shared-memory buffer until the window is closed.
#[derive(Debug, Parser)]
#[command(name = "wayland-window-from-scratch", version, about)]
pub struct Args {
    /// Compositor socket path; overrides WAYLAND_SOCKET and WAYLAND_DISPLAY.
    #[arg(long)]
    pub socket: Option<PathBuf>,

    /// Buffer width in pixels.
    #[arg(long, default_value_t = 100)]
    pub width: u32,

    /// Buffer height in pixels.
    #[arg(long, default_value_t = 100)]
    pub height: u32,

    #[arg(long, value_enum, default_value_t = PixelFormat::Xrgb8888)]
    pub format: PixelFormat,

    /// How redraws are paced.
    #[arg(long, value_enum, default_value_t = RenderMode::Frame)]
    pub mode: RenderMode,

    /// What gets written into the buffer before each commit.
    #[arg(long, value_enum, default_value_t = PaintMode::Invert)]
    pub paint: PaintMode,

    /// Surface role.
    #[arg(long, value_enum, default_value_t = Role::Toplevel)]
    pub role: Role,

    #[arg(long, default_value = "wayland-window-from-scratch")]
    pub title: String,

    #[arg(long, default_value = "wayland-window-from-scratch")]
    pub app_id: String,

    /// Layer-shell namespace (layer role only).
    #[arg(long, default_value = "wayland-window-from-scratch")]
    pub namespace: String,

    /// Log filter, e.g. `debug` or `wayland_window_from_scratch=trace`. Defaults to RUST_LOG.
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PixelFormat {
    Argb8888,
    Xrgb8888,
}

impl From<PixelFormat> for Format {
    fn from(format: PixelFormat) -> Format {
        match format {
            PixelFormat::Argb8888 => Format::Argb8888,
            PixelFormat::Xrgb8888 => Format::Xrgb8888,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderMode {
    /// Redraw on every frame callback.
    Frame,
    /// Redraw once per configure event; no frame callbacks.
    Configure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    /// An xdg-shell toplevel window.
    Toplevel,
    /// A wlr layer-shell surface on the top layer.
    Layer,
}

/// Everything the protocol engine needs to know about the surface it drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    pub format: Format,
    pub mode: RenderMode,
    pub role: Role,
    pub title: String,
    pub app_id: String,
    pub namespace: String,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            format: Format::Xrgb8888,
            mode: RenderMode::Frame,
            role: Role::Toplevel,
            title: "wayland-window-from-scratch".to_owned(),
            app_id: "wayland-window-from-scratch".to_owned(),
            namespace: "wayland-window-from-scratch".to_owned(),
        }
    }
}

impl SurfaceConfig {
    /// Checks the geometry fits the protocol's signed 32-bit pool size.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(anyhow!(
                "surface size must be non-zero, got {}x{}",
                self.width,
                self.height
            ));
        }

        let size = u64::from(self.width)
            * u64::from(self.height)
            * u64::from(self.format.bytes_per_pixel());
        if size > i32::MAX as u64 {
            return Err(anyhow!(
                "a {}x{} buffer needs {} bytes, more than a shm pool can hold",
                self.width,
                self.height,
                size
            ));
        }
        Ok(())
    }
}

impl Args {
    pub fn surface_config(&self) -> anyhow::Result<SurfaceConfig> {
        let config = SurfaceConfig {
            width: self.width,
            height: self.height,
            format: self.format.into(),
            mode: self.mode,
            role: self.role,
            title: self.title.clone(),
            app_id: self.app_id.clone(),
            namespace: self.namespace.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Resolves the compositor socket from the flag and the environment.
    pub fn endpoint(&self) -> anyhow::Result<PathBuf> {
        let env_socket = env_non_empty("WAYLAND_SOCKET").map(PathBuf::from);
        let socket = self.socket.as_deref().or(env_socket.as_deref());

        resolve_endpoint(
            socket,
            env_non_empty("XDG_RUNTIME_DIR").as_deref(),
            env_non_empty("WAYLAND_DISPLAY").as_deref(),
        )
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Picks the compositor socket path.
///
/// Precedence: explicit `socket`, then `runtime_dir/display`, then
/// `runtime_dir/wayland-0`. An absolute `display` is used as is. Empty
/// strings count as unset.
pub fn resolve_endpoint(
    socket: Option<&Path>,
    runtime_dir: Option<&str>,
    display: Option<&str>,
) -> anyhow::Result<PathBuf> {
    if let Some(socket) = socket.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(socket.to_path_buf());
    }

    let display = display.filter(|name| !name.is_empty());
    if let Some(display) = display.map(Path::new).filter(|path| path.is_absolute()) {
        return Ok(display.to_path_buf());
    }

    let runtime_dir = runtime_dir
        .filter(|dir| !dir.is_empty())
        .context("neither a socket path nor XDG_RUNTIME_DIR is set")?;

    Ok(Path::new(runtime_dir).join(display.unwrap_or(DEFAULT_DISPLAY)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_dir_with_default_display() {
        let path = resolve_endpoint(None, Some("/run/user/1000"), None).unwrap();
        assert_eq!(path, PathBuf::from("/run/user/1000/wayland-0"));
    }

    #[test]
    fn explicit_display_name() {
        let path = resolve_endpoint(None, Some("/run/user/1000"), Some("wayland-1")).unwrap();
        assert_eq!(path, PathBuf::from("/run/user/1000/wayland-1"));
    }

    #[test]
    fn socket_override_wins() {
        let path = resolve_endpoint(
            Some(Path::new("/tmp/compositor.sock")),
            Some("/run/user/1000"),
            Some("wayland-1"),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/compositor.sock"));
    }

    #[test]
    fn empty_values_count_as_unset() {
        let path = resolve_endpoint(Some(Path::new("")), Some("/run/user/1000"), Some("")).unwrap();
        assert_eq!(path, PathBuf::from("/run/user/1000/wayland-0"));
    }

    #[test]
    fn absolute_display_is_used_verbatim() {
        let path = resolve_endpoint(None, None, Some("/tmp/wl.sock")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/wl.sock"));
    }

    #[test]
    fn nothing_to_resolve_from() {
        assert!(resolve_endpoint(None, None, Some("wayland-1")).is_err());
        assert!(resolve_endpoint(None, Some(""), None).is_err());
    }

    #[test]
    fn defaults_parse() {
        let args = Args::parse_from(["wayland-window-from-scratch"]);
        let config = args.surface_config().unwrap();

        assert_eq!(config, SurfaceConfig::default());
        assert_eq!(args.paint, PaintMode::Invert);
    }

    #[test]
    fn flags_parse() {
        let args = Args::parse_from([
            "wayland-window-from-scratch",
            "--width",
            "64",
            "--format",
            "argb8888",
            "--mode",
            "configure",
            "--role",
            "layer",
        ]);
        let config = args.surface_config().unwrap();

        assert_eq!(config.width, 64);
        assert_eq!(config.format, Format::Argb8888);
        assert_eq!(config.mode, RenderMode::Configure);
        assert_eq!(config.role, Role::Layer);
    }

    #[test]
    fn rejects_oversized_geometry() {
        let config = SurfaceConfig {
            width: 40_000,
            height: 40_000,
            ..SurfaceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SurfaceConfig {
            width: 0,
            ..SurfaceConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
