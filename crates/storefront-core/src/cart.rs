//! The shopping cart: an ordered set of good ids plus its durable storage.
//!
//! Storage is behind [`CartStorage`] so services can run against a file in
//! production and an in-memory slot in tests.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Result of [`Cart::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Ordered, duplicate-free list of good ids selected for purchase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    ids: Vec<u64>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from stored ids, keeping the first occurrence of each.
    #[must_use]
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let mut cart = Self::new();
        for id in ids {
            cart.add(id);
        }
        cart
    }

    pub fn add(&mut self, id: u64) -> AddOutcome {
        if self.ids.contains(&id) {
            AddOutcome::AlreadyPresent
        } else {
            self.ids.push(id);
            AddOutcome::Added
        }
    }

    /// Removes `id`; returns `false` when it was not in the cart.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&existing| existing != id);
        self.ids.len() != before
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    #[must_use]
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum CartStoreError {
    #[error("failed to write cart to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable slot holding the serialized cart.
pub trait CartStorage {
    /// Reads the stored cart. Missing or unreadable state yields an empty
    /// cart; this never fails.
    fn load(&self) -> Cart;

    /// Replaces the stored cart with `cart`.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError`] if the cart cannot be written.
    fn save(&self, cart: &Cart) -> Result<(), CartStoreError>;
}

/// Stored ids written by older front-ends were sometimes strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredId {
    Number(u64),
    Text(String),
}

/// Parses the stored JSON array. Entries that are not ids are skipped.
/// Returns `None` when the payload is not a JSON array at all.
fn parse_stored_cart(raw: &str) -> Option<Cart> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(raw).ok()?;
    let ids = entries.into_iter().filter_map(|value| {
        match serde_json::from_value::<StoredId>(value).ok()? {
            StoredId::Number(id) => Some(id),
            StoredId::Text(text) => text.trim().parse::<u64>().ok(),
        }
    });
    Some(Cart::from_ids(ids))
}

/// Cart persisted as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    path: PathBuf,
}

impl FileCartStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for FileCartStorage {
    fn load(&self) -> Cart {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Cart::new(),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "cart file unreadable; starting with an empty cart"
                );
                return Cart::new();
            }
        };

        parse_stored_cart(&raw).unwrap_or_else(|| {
            tracing::warn!(
                path = %self.path.display(),
                "cart file is corrupt; starting with an empty cart"
            );
            Cart::new()
        })
    }

    fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        let payload = serde_json::to_string(cart.ids())?;
        let io_err = |source| CartStoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        // Write-then-rename so a crash mid-write never leaves a truncated cart.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), items = cart.len(), "cart saved");
        Ok(())
    }
}

/// In-process storage holding the last saved JSON payload.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    raw: RefCell<Option<String>>,
}

impl MemoryCartStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the slot with a raw payload, as if written by a previous run.
    #[must_use]
    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: RefCell::new(Some(raw.to_string())),
        }
    }

    /// The last payload written, if any.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.raw.borrow().clone()
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self) -> Cart {
        self.raw
            .borrow()
            .as_deref()
            .and_then(parse_stored_cart)
            .unwrap_or_default()
    }

    fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        let payload = serde_json::to_string(cart.ids())?;
        *self.raw.borrow_mut() = Some(payload);
        Ok(())
    }
}
