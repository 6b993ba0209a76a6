use crate::error::{ReleaseError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A directory temporarily moved somewhere else.
///
/// The move is undone by [`Relocation::release`] or, if that is never
/// reached, when the guard is dropped.
#[derive(Debug)]
pub struct Relocation {
    from: PathBuf,
    to: PathBuf,
    active: bool,
}

impl Relocation {
    /// Move `from` to `to`
    pub fn acquire(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<Self> {
        let from = from.as_ref().to_path_buf();
        let to = to.as_ref().to_path_buf();

        if to.exists() {
            return Err(ReleaseError::fs(
                &to,
                std::io::Error::new(std::io::ErrorKind::AlreadyExists, "destination exists"),
            ));
        }
        fs::rename(&from, &to).map_err(|e| ReleaseError::fs(&from, e))?;
        debug!(from = %from.display(), to = %to.display(), "relocated");

        Ok(Relocation {
            from,
            to,
            active: true,
        })
    }

    /// Move the directory back, reporting failure
    pub fn release(mut self) -> Result<()> {
        self.active = false;
        self.restore()
    }

    fn restore(&self) -> Result<()> {
        fs::rename(&self.to, &self.from).map_err(|e| ReleaseError::fs(&self.to, e))?;
        debug!(path = %self.from.display(), "restored");
        Ok(())
    }
}

impl Drop for Relocation {
    fn drop(&mut self) {
        if self.active {
            if let Err(err) = self.restore() {
                warn!(error = %err, "failed to return {}", self.from.display());
            }
        }
    }
}
