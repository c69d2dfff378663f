//! Framed result stream on stdout
//!
//! Each frame is exactly three lines:
//!
//! ```text
//! ---NANOCLAW_OUTPUT_START---
//! {"status":"success","result":"hi there","newSessionId":"…"}
//! ---NANOCLAW_OUTPUT_END---
//! ```
//!
//! The runner writes with [`OutputChannel`], flushing after every line so the
//! host sees frames as they happen. Host-side consumers (and tests) read the
//! stream back with [`FrameReader`], which ignores anything outside markers.

use crate::schema::OutputFrame;
use std::io::{self, BufRead, Write};

pub const OUTPUT_START_MARKER: &str = "---NANOCLAW_OUTPUT_START---";
pub const OUTPUT_END_MARKER: &str = "---NANOCLAW_OUTPUT_END---";

/// Writer half of the output protocol
pub struct OutputChannel<W> {
    writer: W,
}

impl OutputChannel<io::Stdout> {
    /// Channel over the process stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> OutputChannel<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write one frame, flushing after each line
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the frame cannot be serialized or written.
    pub fn emit(&mut self, frame: &OutputFrame) -> io::Result<()> {
        let json = serde_json::to_string(frame)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.write_line(OUTPUT_START_MARKER)?;
        self.write_line(&json)?;
        self.write_line(OUTPUT_END_MARKER)?;
        Ok(())
    }

    /// Consume the channel, returning the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Borrow the underlying writer
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

/// Reader half of the output protocol
pub struct FrameReader<R> {
    reader: R,
    buf: String,
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
        }
    }

    /// Read the next frame, returning `None` on EOF
    ///
    /// Lines outside a start/end marker pair are skipped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if a frame body is not a valid frame, or
    /// `UnexpectedEof` if the stream ends inside a frame.
    pub fn next_frame(&mut self) -> io::Result<Option<OutputFrame>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            if self.buf.trim() == OUTPUT_START_MARKER {
                break;
            }
        }

        let mut body = String::new();
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "EOF inside output frame",
                ));
            }
            let line = self.buf.trim();
            if line == OUTPUT_END_MARKER {
                break;
            }
            body.push_str(line);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Read every remaining frame
    ///
    /// # Errors
    ///
    /// See [`FrameReader::next_frame`].
    pub fn read_all(mut self) -> io::Result<Vec<OutputFrame>> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }
}
