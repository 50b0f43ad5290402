//! LC-3 memory subsystem.
//!
//! 65536 sixteen-bit words. Two addresses are wired to the keyboard:
//! reading KBSR polls the console for a key and latches it into KBDR.

use crate::cpu::console::Console;
use crate::image::Image;
use log::*;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of words in LC-3 memory.
pub const MEMORY_SIZE: usize = 1 << 16;

/// Keyboard status register. Bit 15 set means a key is available.
pub const KBSR: u16 = 0xFE00;

/// Keyboard data register. Holds the last key read.
pub const KBDR: u16 = 0xFE02;

/// KBSR value when a key has been latched.
const KEY_AVAILABLE: u16 = 1 << 15;

/// LC-3 memory: 65536 words.
///
/// Serializes as a flat array of words; deserializing rejects any other length.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u16>", into = "Vec<u16>")]
pub struct Memory {
    cells: Vec<u16>,
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read a word, performing device side effects.
    ///
    /// Reading KBSR blocks for one byte from the console first. A non-zero byte
    /// marks a key as available and stores it in KBDR; a zero byte reads as
    /// "no key" and leaves KBDR alone.
    pub fn read<C: Console + ?Sized>(&mut self, addr: u16, console: &mut C) -> Result<u16, MemoryError> {
        if addr == KBSR {
            let key = console.read_byte().map_err(MemoryError::Keyboard)?;
            if key != 0 {
                self.cells[KBSR as usize] = KEY_AVAILABLE;
                self.cells[KBDR as usize] = u16::from(key);
            } else {
                self.cells[KBSR as usize] = 0;
            }
        }

        Ok(self.peek(addr))
    }

    /// Read a word without any device side effects.
    #[inline]
    pub fn peek(&self, addr: u16) -> u16 {
        self.cells[addr as usize]
    }

    #[inline]
    pub fn write(&mut self, addr: u16, value: u16) {
        self.cells[addr as usize] = value;
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Copy an image into memory starting at its origin.
    ///
    /// Words that would land past the last address are dropped.
    /// Returns the number of words written.
    pub fn load_image(&mut self, image: &Image) -> usize {
        let start = image.origin as usize;
        let available = MEMORY_SIZE - start;
        let count = image.words.len().min(available);

        if count < image.words.len() {
            warn!(
                "image at {:#06x} has {} words, only {} fit before the end of memory",
                image.origin,
                image.words.len(),
                count
            );
        }

        self.cells[start..start + count].copy_from_slice(&image.words[..count]);
        count
    }

    /// Dump memory contents (for debugging).
    pub fn dump(&self, start: u16, count: usize) -> Vec<(u16, u16)> {
        let end = (start as usize + count).min(MEMORY_SIZE);
        (start as usize..end)
            .map(|i| (i as u16, self.cells[i]))
            .collect()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&Image> for Memory {
    fn from(image: &Image) -> Self {
        let mut mem = Memory::new();
        mem.load_image(image);
        mem
    }
}

impl TryFrom<Vec<u16>> for Memory {
    type Error = MemoryError;

    fn try_from(cells: Vec<u16>) -> Result<Self, Self::Error> {
        if cells.len() != MEMORY_SIZE {
            return Err(MemoryError::WrongSize(cells.len()));
        }
        Ok(Self { cells })
    }
}

impl From<Memory> for Vec<u16> {
    fn from(mem: Memory) -> Self {
        mem.cells
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only count non-zero cells
        let non_zero = self.cells.iter().filter(|&&cell| cell != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("keyboard read failed: {0}")]
    Keyboard(#[source] std::io::Error),

    #[error("memory holds {0} words, expected {}", MEMORY_SIZE)]
    WrongSize(usize),
}
