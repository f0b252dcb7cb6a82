use crate::Error;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// What a load did to the registry
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Loaded {
    /// The path wasn't known, a new entry was added
    New,
    /// The path was already known, its entry was reloaded in place
    Refreshed,
}

/// Somewhere generated images end up, keyed by absolute file path
pub trait ImageRegistry {
    /// Loads `path`, or reloads it if an entry for it already exists
    fn load_or_refresh(&mut self, path: &Path) -> Result<Loaded, Error>;
}

pub struct CachedImage {
    pub image: image::DynamicImage,
    /// How many times the entry was reloaded after the first load
    pub reloads: u32,
}

/// In-memory `ImageRegistry`
#[derive(Default)]
pub struct ImageCache {
    images: HashMap<PathBuf, CachedImage>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&CachedImage> {
        self.images.get(&key(path))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageRegistry for ImageCache {
    fn load_or_refresh(&mut self, path: &Path) -> Result<Loaded, Error> {
        let key = key(path);
        let image = image::open(&key)?;

        match self.images.get_mut(&key) {
            Some(cached) => {
                cached.image = image;
                cached.reloads += 1;
                log::info!("reloaded {}", key.display());
                Ok(Loaded::Refreshed)
            }
            None => {
                log::info!("loaded {}", key.display());
                self.images.insert(key, CachedImage { image, reloads: 0 });
                Ok(Loaded::New)
            }
        }
    }
}

fn key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_e| path.to_owned())
}
