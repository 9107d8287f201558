//! Output sinks for resolved directory entries.
//!
//! Entries reach a sink one at a time, as each page is read, and every sink
//! flushes per entry so partial results survive a later failure.

use std::io::{self, Write};

use crate::directory::DirectoryEntry;

/// Receives directory entries in document order.
pub trait EntrySink {
    /// Writes one entry.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error when the entry cannot be written.
    fn emit(&mut self, entry: &DirectoryEntry) -> io::Result<()>;
}

impl EntrySink for Vec<DirectoryEntry> {
    fn emit(&mut self, entry: &DirectoryEntry) -> io::Result<()> {
        self.push(entry.clone());
        Ok(())
    }
}

/// Labeled multi-line records for terminal use.
///
/// ```text
/// ****Account****
/// Name: Alice
/// Telephone: 1000
/// ```
#[derive(Debug)]
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EntrySink for TextSink<W> {
    fn emit(&mut self, entry: &DirectoryEntry) -> io::Result<()> {
        writeln!(self.out, "****Account****")?;
        writeln!(self.out, "Name: {}", entry.name)?;
        writeln!(self.out, "Telephone: {}", entry.telephone)?;
        self.out.flush()
    }
}

/// One JSON object per line, for piping into other tools.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EntrySink for JsonLinesSink<W> {
    fn emit(&mut self, entry: &DirectoryEntry) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, entry)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}
