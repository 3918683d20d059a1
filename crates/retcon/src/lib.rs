//! Public SDK surface for Retcon.
//!
//! This crate re-exports the registry and client crates and wires them
//! together: load the layered sources for a base name, derive the
//! connection target, and hand both to a supervisor.

/// Re-export for convenience.
pub use retcon_client as client;
/// Re-export for convenience.
pub use retcon_config as config;

use log::{info, warn};
use retcon_client::{ConnectionSupervisor, ConnectionTarget, Transport, declare_target_keys};
use retcon_config::{ConfigRegistry, KeyDeclaration, PropertyKind, SourceLayout};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Base name used when none is given: file stem `test`, prefix `TEST_`.
pub const DEFAULT_BASE_NAME: &str = "test";
/// Duration key controlling how long the process stays alive.
pub const LIFETIME_KEY: &str = "lifetime";
/// Keep-alive used when `lifetime` is not configured.
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(60);
/// Longest keep-alive honoured; larger configured values are capped.
pub const MAX_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// Logs go to stdout at `info` unless `RUST_LOG` says otherwise. Calling it
/// twice is harmless.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp_millis()
            .target(env_logger::Target::Stdout)
            .try_init();
    }
}

/// A loaded registry and the target derived from it.
#[derive(Debug)]
pub struct Bootstrap {
    pub registry: Arc<ConfigRegistry>,
    pub target: ConnectionTarget,
}

impl Bootstrap {
    /// Configured keep-alive capped at `MAX_LIFETIME`, or `DEFAULT_LIFETIME`.
    pub fn lifetime(&self) -> Duration {
        let lifetime = self
            .registry
            .get_duration(LIFETIME_KEY)
            .unwrap_or(DEFAULT_LIFETIME);
        if lifetime > MAX_LIFETIME {
            warn!(
                "lifetime out of range, capping (lifetime={:?}, max={:?})",
                lifetime, MAX_LIFETIME
            );
            return MAX_LIFETIME;
        }
        lifetime
    }

    /// Supervisor sharing this registry.
    pub fn supervisor(&self, transport: Arc<dyn Transport>) -> ConnectionSupervisor {
        ConnectionSupervisor::new(Arc::clone(&self.registry), transport)
    }
}

/// Load `base_name` from the current directory and the process environment.
pub fn bootstrap(base_name: &str) -> std::io::Result<Bootstrap> {
    let cwd = std::env::current_dir()?;
    Ok(bootstrap_in(base_name, &cwd))
}

/// Load `base_name` with config files resolved against `dir`.
pub fn bootstrap_in(base_name: &str, dir: &Path) -> Bootstrap {
    bootstrap_with_layout(&SourceLayout::new(base_name, dir))
}

/// Load an explicit source layout.
pub fn bootstrap_with_layout(layout: &SourceLayout) -> Bootstrap {
    info!(
        "bootstrapping configuration (base_name={}, dir={})",
        layout.base_name,
        layout.dir.display()
    );
    let registry = ConfigRegistry::new();
    declare_target_keys(&registry);
    registry.declare(LIFETIME_KEY, KeyDeclaration::optional(PropertyKind::Duration));
    registry.load(&layout.sources());

    let missing = registry.missing_required();
    if !missing.is_empty() {
        warn!("required keys missing (keys={})", missing.join(","));
    }

    let target = ConnectionTarget::from_registry(&registry);
    Bootstrap {
        registry: Arc::new(registry),
        target,
    }
}
