//! File-based archive source.
//!
//! Reads an archive from disk, decoding plain JSON directly or streaming it
//! through a base64 decoder first. Nothing is buffered beyond the decoders'
//! own read buffers; the decoded stream is materialized in memory.

use super::{ArchiveFormat, FormatChoice};
use crate::model::error::InputError;
use crate::model::MsgStream;
use crate::parser;
use base64::engine::general_purpose::STANDARD;
use base64::read::DecoderReader;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An archive file and the encoding it will be decoded with.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: ArchiveFormat,
}

impl FileSource {
    /// Create a source for the given path.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist.
    pub fn new(path: impl Into<PathBuf>, choice: FormatChoice) -> Result<Self, InputError> {
        let path = path.into();

        if !path.exists() {
            return Err(InputError::FileNotFound { path });
        }

        let format = choice.resolve(&path);
        debug!(path = %path.display(), %format, ?choice, "Archive format resolved");

        Ok(Self { path, format })
    }

    /// Path of the archive.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encoding the archive will be decoded with.
    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    /// Read and decode the whole archive.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` if the file cannot be opened and
    /// `InputError::Malformed` if its content does not decode.
    pub fn load(self) -> Result<MsgStream, InputError> {
        let file = File::open(&self.path)?;

        let decoded = match self.format {
            ArchiveFormat::Json => parser::parse_stream(file),
            ArchiveFormat::Base64 => {
                let text = SkipWhitespace::new(BufReader::new(file));
                parser::parse_stream(DecoderReader::new(text, &STANDARD))
            }
        };

        let stream = decoded.map_err(|e| InputError::Malformed {
            path: self.path.clone(),
            format: self.format,
            message: e.to_string(),
        })?;

        info!(
            path = %self.path.display(),
            format = %self.format,
            batches = stream.len(),
            messages = stream.iter().map(|batch| batch.len()).sum::<usize>(),
            "Archive decoded"
        );

        Ok(stream)
    }
}

/// Reader adapter that drops ASCII whitespace.
///
/// Base64 exports are commonly line-wrapped; the decoder only accepts the
/// alphabet and padding.
#[derive(Debug)]
struct SkipWhitespace<R> {
    inner: R,
}

impl<R: Read> SkipWhitespace<R> {
    fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> Read for SkipWhitespace<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let read = self.inner.read(buf)?;
            if read == 0 {
                return Ok(0);
            }

            let mut kept = 0;
            for i in 0..read {
                if !buf[i].is_ascii_whitespace() {
                    buf[kept] = buf[i];
                    kept += 1;
                }
            }

            // a chunk of pure whitespace is not EOF; keep reading
            if kept > 0 {
                return Ok(kept);
            }
        }
    }
}
