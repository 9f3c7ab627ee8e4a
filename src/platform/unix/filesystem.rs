//! Unix filesystem operations

use crate::platform::traits::FilesystemOps;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

pub struct UnixFilesystem;

impl UnixFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl FilesystemOps for UnixFilesystem {
    fn is_executable(&self, path: &Path) -> bool {
        // Follows symlinks, so /usr/local/bin/barked -> ../Cellar/... resolves
        if let Ok(metadata) = path.metadata() {
            if metadata.is_file() {
                return (metadata.permissions().mode() & 0o111) != 0;
            }
        }
        false
    }
}
