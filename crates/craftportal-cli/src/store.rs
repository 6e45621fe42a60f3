//! File-backed session cart.

use std::path::{Path, PathBuf};

use craftportal_core::Cart;

/// Persists the cart as JSON at a fixed path.
#[derive(Debug, Clone)]
pub(crate) struct CartStore {
    path: PathBuf,
}

impl CartStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the saved cart; a missing file is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub(crate) fn load(&self) -> anyhow::Result<Cart> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Cart::new()),
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "failed to read cart {}: {e}",
                    self.path.display()
                ))
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            anyhow::anyhow!(
                "cart file {} is corrupt ({e}); run `craftportal cart clear` to reset it",
                self.path.display()
            )
        })
    }

    /// Writes `cart`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub(crate) fn save(&self, cart: &Cart) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(cart)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), items = cart.item_count(), "cart saved");
        Ok(())
    }
}
