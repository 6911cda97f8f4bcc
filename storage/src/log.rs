//! A crash-safe append-only frame log.
//!
//! Each record is written as an 8-byte little-endian length prefix followed
//! by that many bytes, then flushed. A process that dies mid-write leaves a
//! dangling length prefix (or a short body); on the next open,
//! [`Log::read_all`] detects and discards that trailing partial frame
//! instead of returning garbage or erroring out.

use std::{
    fs::{File, OpenOptions},
    io::{self, BufReader, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use parking_lot::Mutex;

/// Errors from the underlying file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Generic I/O failure opening, reading or writing the log file.
    #[error("log I/O error at {path}: {source}")]
    Io {
        /// Path of the log file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

fn io_error(path: &Path, source: io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// An append-only file of length-prefixed frames.
pub(crate) struct Log {
    path: PathBuf,
    writer: Mutex<File>,
}

impl Log {
    /// Open (creating if absent) the log at `path`. Any trailing partial
    /// frame left by a previous crash is truncated away.
    pub(crate) fn open(path: &Path) -> Result<Self, Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
        }

        let valid_len = {
            let mut file = OpenOptions::new()
                .read(true)
                .open(path)
                .or_else(|_| OpenOptions::new().read(true).write(true).create(true).open(path))
                .map_err(|e| io_error(path, e))?;
            Self::last_valid_offset(&mut file).map_err(|e| io_error(path, e))?
        };

        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| io_error(path, e))?;
        file.set_len(valid_len).map_err(|e| io_error(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(file),
        })
    }

    /// Scan the file frame by frame, returning the byte offset just past the
    /// last *complete* frame. Anything after that offset is a torn write.
    fn last_valid_offset(file: &mut File) -> io::Result<u64> {
        let mut reader = BufReader::new(&mut *file);
        let mut offset: u64 = 0;
        loop {
            let mut len_bytes = [0_u8; 8];
            match reader.read_exact(&mut len_bytes) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            }
            let len = u64::from_le_bytes(len_bytes);
            let mut body = vec![0_u8; len as usize];
            match reader.read_exact(&mut body) {
                Ok(()) => {
                    offset += 8 + len;
                }
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            }
        }
        Ok(offset)
    }

    /// Append `frame` and flush before returning, so a successful `append`
    /// is durable against an immediately following crash.
    pub(crate) fn append(&self, frame: &[u8]) -> Result<(), Error> {
        let mut writer = self.writer.lock();
        writer
            .write_all(&(frame.len() as u64).to_le_bytes())
            .map_err(|e| io_error(&self.path, e))?;
        writer.write_all(frame).map_err(|e| io_error(&self.path, e))?;
        writer.flush().map_err(|e| io_error(&self.path, e))?;
        Ok(())
    }

    /// Read every complete frame currently in the log, in append order.
    pub(crate) fn read_all(&self) -> Result<Vec<Vec<u8>>, Error> {
        let mut file = File::open(&self.path).map_err(|e| io_error(&self.path, e))?;
        file.seek(SeekFrom::Start(0)).map_err(|e| io_error(&self.path, e))?;
        let mut reader = BufReader::new(file);
        let mut frames = Vec::new();
        loop {
            let mut len_bytes = [0_u8; 8];
            match reader.read_exact(&mut len_bytes) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(io_error(&self.path, e)),
            }
            let len = u64::from_le_bytes(len_bytes);
            let mut body = vec![0_u8; len as usize];
            reader.read_exact(&mut body).map_err(|e| io_error(&self.path, e))?;
            frames.push(body);
        }
        Ok(frames)
    }

    /// Flush and drop the underlying file handle. Idempotent: the file is
    /// reopened and re-flushed harmlessly if called again.
    pub(crate) fn close(&self) -> Result<(), Error> {
        self.writer
            .lock()
            .flush()
            .map_err(|e| io_error(&self.path, e))
    }
}
