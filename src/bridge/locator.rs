//! Script and interpreter resolution
//!
//! Both paths are resolved from an ordered candidate list: the first
//! candidate that is an executable regular file wins, otherwise a fixed
//! fallback is used. Resolution happens on every run so that installing
//! the script while the panel is open takes effect immediately.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::LocatorConfig;
use crate::platform::{FilesystemOps, Platform};

/// Name of the script shipped inside an application bundle
pub const BUNDLED_SCRIPT_NAME: &str = "barked.sh";

/// Resolves interpreter and script paths
#[derive(Clone)]
pub struct ScriptLocator {
    config: LocatorConfig,
    fs: Arc<dyn FilesystemOps>,
}

impl ScriptLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self {
            config,
            fs: Arc::from(Platform::filesystem()),
        }
    }

    /// Use a custom filesystem probe
    pub fn with_filesystem(config: LocatorConfig, fs: Arc<dyn FilesystemOps>) -> Self {
        Self { config, fs }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// First candidate that exists and is executable
    pub fn first_executable(&self, candidates: &[PathBuf]) -> Option<PathBuf> {
        candidates
            .iter()
            .map(|candidate| expand_home(candidate))
            .find(|candidate| self.fs.is_executable(candidate))
    }

    /// Path of the barked script
    pub fn resolve_script(&self) -> PathBuf {
        if let Some(found) = self.first_executable(&self.config.script_candidates) {
            debug!("Resolved script at {}", found.display());
            return found;
        }
        if let Some(bundled) = bundled_script() {
            debug!("Using bundled script at {}", bundled.display());
            return bundled;
        }
        let fallback = expand_home(&self.config.script_fallback);
        debug!("No script candidate found, falling back to {}", fallback.display());
        fallback
    }

    /// Path of the shell interpreter (Bash 4+ preferred)
    pub fn resolve_interpreter(&self) -> PathBuf {
        self.first_executable(&self.config.interpreter_candidates)
            .unwrap_or_else(|| expand_home(&self.config.interpreter_fallback))
    }
}

impl Default for ScriptLocator {
    fn default() -> Self {
        Self::new(LocatorConfig::default())
    }
}

impl std::fmt::Debug for ScriptLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptLocator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Script bundled next to the running executable
///
/// Checks `<exe dir>/../Resources/barked.sh` (app bundle layout) and then
/// `<exe dir>/barked.sh`.
pub fn bundled_script() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let exe_dir = exe.parent()?;
    [
        exe_dir.join("..").join("Resources").join(BUNDLED_SCRIPT_NAME),
        exe_dir.join(BUNDLED_SCRIPT_NAME),
    ]
    .into_iter()
    .find(|candidate| candidate.is_file())
}

/// Expand a leading `~/` against the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
