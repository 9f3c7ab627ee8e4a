//! Unix path operations

use crate::error::{Error, Result};
use crate::platform::traits::PathOps;
use std::path::PathBuf;

pub struct UnixPaths;

impl UnixPaths {
    pub fn new() -> Self {
        Self
    }
}

impl PathOps for UnixPaths {
    fn home_dir(&self) -> Result<PathBuf> {
        dirs::home_dir().ok_or_else(|| Error::DirectoryUnavailable {
            kind: "home".to_string(),
        })
    }

    fn config_dir(&self) -> Result<PathBuf> {
        // Fixed ~/.config on every platform; the script reads nothing else
        Ok(self.home_dir()?.join(".config"))
    }
}
