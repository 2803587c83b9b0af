// src/install/mod.rs

//! Installing resolved versions
//!
//! Plans are built by [`build_plan`] and carried out by a
//! [`PackageInstaller`]. [`NpmInstaller`] is the real one.

mod npm;
mod plan;

pub use npm::NpmInstaller;
pub use plan::{INSTALL_FLAGS, InstallPlan, build_plan};

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// Directory npm installs into
pub const NODE_MODULES: &str = "node_modules";

/// Something that can carry out an install plan
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// The command line that [`install`](Self::install) would run
    fn command_line(&self, plan: &InstallPlan) -> String;

    /// Run the install; returns once the installer has exited
    async fn install(&self, plan: &InstallPlan) -> Result<()>;
}

/// Remove `node_modules` from a project directory
///
/// Returns whether anything was removed.
pub fn clear_node_modules(project_dir: &Path) -> Result<bool> {
    let target = project_dir.join(NODE_MODULES);
    if !target.exists() {
        return Ok(false);
    }

    info!("Removing {}", target.display());
    std::fs::remove_dir_all(&target).map_err(|e| {
        Error::IoError(format!("Failed to remove {}: {e}", target.display()))
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        let modules = dir.path().join(NODE_MODULES).join("left-pad");
        std::fs::create_dir_all(&modules).unwrap();
        std::fs::write(modules.join("index.js"), "module.exports = 1;").unwrap();

        assert!(clear_node_modules(dir.path()).unwrap());
        assert!(!dir.path().join(NODE_MODULES).exists());
        assert!(!clear_node_modules(dir.path()).unwrap());
    }
}
