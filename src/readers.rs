//! Input byte sources
//!
//! [`MappedInput`] gives the parallel pipeline one contiguous read-only view
//! of a file. [`open_line_reader`] is the sequential fallback that reads owned
//! lines through a buffered reader.

use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// A read-only memory map of an input file.
///
/// Empty files are not mapped; they read as an empty slice. The mapping is
/// released when this value is dropped.
#[derive(Debug)]
pub struct MappedInput {
    path: PathBuf,
    map: Option<Mmap>,
}

impl MappedInput {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let (file, len) = open_regular_file(path)?;

        if len == 0 {
            return Ok(Self {
                path: path.to_path_buf(),
                map: None,
            });
        }

        // SAFETY: the map is read-only and never outlives `self`. Concurrent
        // truncation of the file by another process is outside our control.
        let map = unsafe { MmapOptions::new().map(&file) }.map_err(|source| PipelineError::Map {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            map: Some(map),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> u64 {
        self.as_bytes().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Open `path` for sequential line reading. Returns the reader and the file
/// size used for progress.
pub fn open_line_reader(path: impl AsRef<Path>) -> Result<(BufReader<File>, u64), PipelineError> {
    let (file, len) = open_regular_file(path.as_ref())?;
    Ok((BufReader::new(file), len))
}

fn open_regular_file(path: &Path) -> Result<(File, u64), PipelineError> {
    let open_error = |source: io::Error| PipelineError::Open {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(open_error)?;
    let metadata = file.metadata().map_err(open_error)?;
    if metadata.is_dir() {
        return Err(open_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "is a directory",
        )));
    }
    Ok((file, metadata.len()))
}
