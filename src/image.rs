//! LC-3 object image format.
//!
//! An image is a flat big-endian stream of 16-bit words:
//! - Word 0 is the origin, the address the program is loaded at
//! - Every following word is placed at consecutive addresses from the origin

use log::*;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// A loaded program image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Address of the first word.
    pub origin: u16,
    /// Program words, in load order.
    pub words: Vec<u16>,
}

impl Image {
    pub fn new(origin: u16, words: Vec<u16>) -> Self {
        Self { origin, words }
    }

    /// Parse an image from raw bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, ImageError> {
        let (header, body) = match bytes {
            [hi, lo, rest @ ..] => ([*hi, *lo], rest),
            _ => return Err(ImageError::MissingOrigin),
        };
        let origin = u16::from_be_bytes(header);

        let chunks = body.chunks_exact(2);
        if !chunks.remainder().is_empty() {
            warn!("image has a trailing odd byte, ignoring it");
        }
        let words = chunks
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();

        Ok(Self { origin, words })
    }

    /// Read and parse an image from any byte source.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self, ImageError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::parse(&bytes)
    }

    /// Number of program words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// `(address, word)` pairs for every word that fits in memory.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        (self.origin..=u16::MAX).zip(self.words.iter().copied())
    }
}

/// Load an image file from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Image, ImageError> {
    let path = path.as_ref();
    info!("Loading image: '{}'", path.display());

    let file = std::fs::File::open(path)?;
    let image = Image::read_from(std::io::BufReader::new(file))?;

    info!("Origin memory location: {:#06x}, {} words", image.origin, image.len());
    Ok(image)
}

/// Errors that can occur while loading an image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image is too short to hold an origin")]
    MissingOrigin,
}
