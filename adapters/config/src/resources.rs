//! Named resource lookup with a logged fallback.

use std::{collections::HashMap, fmt};

use thiserror::Error;
use tracing::{debug, warn};

/// Colour of the texture substituted for resources that fail to load.
pub const PLACEHOLDER_COLOR: [u8; 4] = [255, 0, 0, 255];

const PLACEHOLDER_SIDE: u32 = 16;

/// Resources that can stand in for themselves when loading fails.
pub trait Placeholder {
    /// Returns the stand-in value.
    fn placeholder() -> Self;
}

/// Errors raised when raw pixel data does not describe a texture.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextureError {
    /// The byte count does not match the dimensions.
    #[error("expected {expected} bytes of RGBA data, found {actual}")]
    Size {
        /// Bytes required by the dimensions.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
}

/// RGBA image addressed by pixel coordinates.
#[derive(Clone, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Texture {
    /// Creates a texture filled with `color`.
    #[must_use]
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            rgba: color.repeat(pixels),
        }
    }

    /// Wraps raw RGBA bytes, row-major from the top-left pixel.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(TextureError::Size {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Colour at `(x, y)`, `None` outside the texture.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.rgba.get(start..start + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Placeholder for Texture {
    fn placeholder() -> Self {
        Self::solid(PLACEHOLDER_SIDE, PLACEHOLDER_SIDE, PLACEHOLDER_COLOR)
    }
}

type Loader<R> = Box<dyn FnMut(&str) -> anyhow::Result<R>>;

/// Cache of resources keyed by logical name.
///
/// Each name is loaded once. A failed load is logged and cached as the
/// resource's placeholder, so the loader is not retried for that name.
pub struct ResourceCache<R> {
    loader: Loader<R>,
    entries: HashMap<String, R>,
    failures: usize,
}

impl<R: Placeholder> ResourceCache<R> {
    /// Creates an empty cache that resolves names through `loader`.
    pub fn new(loader: impl FnMut(&str) -> anyhow::Result<R> + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            entries: HashMap::new(),
            failures: 0,
        }
    }

    /// Resource called `name`, loading it on first use.
    pub fn get(&mut self, name: &str) -> &R {
        let Self {
            loader,
            entries,
            failures,
        } = self;
        entries.entry(name.to_owned()).or_insert_with(|| match loader(name) {
            Ok(resource) => {
                debug!(resource = name, "resource loaded");
                resource
            }
            Err(error) => {
                warn!(resource = name, "resource failed to load, using placeholder: {error:#}");
                *failures += 1;
                R::placeholder()
            }
        })
    }

    /// Number of names resolved so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of names that fell back to the placeholder.
    #[must_use]
    pub const fn failures(&self) -> usize {
        self.failures
    }
}

impl<R> fmt::Debug for ResourceCache<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache")
            .field("entries", &self.entries.len())
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use anyhow::bail;

    use super::*;

    #[test]
    fn raw_data_must_match_dimensions() {
        let error = Texture::from_rgba(2, 2, vec![0; 15]).expect_err("one byte short");
        assert_eq!(
            error,
            TextureError::Size {
                expected: 16,
                actual: 15
            }
        );
        let texture = Texture::from_rgba(1, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).expect("valid");
        assert_eq!(texture.pixel(0, 1), Some([5, 6, 7, 8]));
        assert_eq!(texture.pixel(1, 0), None);
    }

    #[test]
    fn failures_fall_back_to_a_red_placeholder() {
        let mut cache = ResourceCache::new(|name: &str| -> anyhow::Result<Texture> {
            bail!("no file for {name}")
        });
        let texture = cache.get("player");
        assert_eq!(texture.pixel(0, 0), Some(PLACEHOLDER_COLOR));
        assert_eq!(cache.failures(), 1);
    }

    #[test]
    fn each_name_is_loaded_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut cache = ResourceCache::new(move |name: &str| {
            counter.set(counter.get() + 1);
            if name == "missing" {
                bail!("missing");
            }
            Ok(Texture::solid(2, 2, [0, 0, 255, 255]))
        });

        for _ in 0..3 {
            assert_eq!(cache.get("wall").width(), 2);
            assert_eq!(cache.get("missing").width(), 16);
        }
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.failures(), 1);
    }
}
