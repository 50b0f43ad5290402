//! Host console attached to the LC-3.
//!
//! The keyboard (traps and the memory-mapped KBSR/KBDR pair) reads from the console
//! and the display traps write to it. Everything here is byte oriented.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

/// Byte-oriented I/O contract consumed by the CPU.
pub trait Console {
    /// Block until one input byte is available.
    ///
    /// Exhausted input is reported as an error, never as a byte.
    fn read_byte(&mut self) -> io::Result<u8>;

    /// Write a byte back onto the input side of the console.
    fn echo_input(&mut self, byte: u8) -> io::Result<()>;

    /// Write bytes to the display.
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Flush anything buffered for the display or the input echo.
    fn flush(&mut self) -> io::Result<()>;
}

/// Console backed by the process stdin and stdout.
pub struct StdConsole {
    stdin: io::Stdin,
    stdout: io::Stdout,
    echo: Option<std::fs::File>,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
            echo: None,
        }
    }

    #[cfg(unix)]
    fn echo_target(&mut self) -> io::Result<&mut dyn Write> {
        use std::os::fd::AsFd;

        let file = match self.echo.take() {
            Some(file) => file,
            None => std::fs::File::from(self.stdin.as_fd().try_clone_to_owned()?),
        };
        Ok(self.echo.insert(file))
    }

    // No writable handle on stdin here; the display is the closest stand-in.
    #[cfg(not(unix))]
    fn echo_target(&mut self) -> io::Result<&mut dyn Write> {
        Ok(&mut self.stdout)
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn read_byte(&mut self) -> io::Result<u8> {
        let mut byte = [0u8; 1];
        self.stdin.lock().read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn echo_input(&mut self, byte: u8) -> io::Result<()> {
        self.echo_target()?.write_all(&[byte])
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stdout.lock().write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(echo) = self.echo.as_mut() {
            echo.flush()?;
        }
        self.stdout.flush()
    }
}

/// In-memory console: a queue of pending keystrokes plus captured output.
#[derive(Debug, Clone, Default)]
pub struct BufferConsole {
    input: VecDeque<u8>,
    /// Bytes written to the display.
    pub output: Vec<u8>,
    /// Bytes echoed back onto the input side.
    pub echoed: Vec<u8>,
    /// Number of flushes requested.
    pub flushes: usize,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a console with pending keyboard input.
    pub fn with_input(input: impl AsRef<[u8]>) -> Self {
        Self {
            input: input.as_ref().iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Queue more keyboard input.
    pub fn push_input(&mut self, bytes: impl AsRef<[u8]>) {
        self.input.extend(bytes.as_ref());
    }

    /// Keystrokes not consumed yet.
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Display output decoded lossily as text.
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl Console for BufferConsole {
    fn read_byte(&mut self) -> io::Result<u8> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "keyboard input exhausted"))
    }

    fn echo_input(&mut self, byte: u8) -> io::Result<()> {
        self.echoed.push(byte);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
