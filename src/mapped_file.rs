use std::{
    fs::File,
    io,
    ops::Deref,
    path::{Path, PathBuf},
};

use log::debug;
use memmap2::Mmap;

use crate::error::{Error, Result};

/// A file mapped read-only into memory.
///
/// The file handle is only held while the mapping is created; the mapping
/// itself is released when the `MappedFile` is dropped.
#[derive(Debug)]
pub struct MappedFile {
    path: PathBuf,
    map: Mmap,
}

impl MappedFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!("Opening {}", path.to_string_lossy());

        let file = File::open(&path).map_err(|source| Error::FileNotAccessible {
            path: path.clone(),
            source,
        })?;

        let length = file
            .metadata()
            .map_err(|source| Error::FileNotAccessible {
                path: path.clone(),
                source,
            })?
            .len();

        if length == 0 {
            return Err(Error::MappingFailed {
                path,
                source: io::Error::new(io::ErrorKind::InvalidData, "file is empty"),
            });
        }

        // SAFETY: the mapping is read-only and only ever exposed as `&[u8]`.
        // Another process truncating the file while it is mapped is not
        // guarded against.
        let map = unsafe { Mmap::map(&file) }.map_err(|source| Error::MappingFailed {
            path: path.clone(),
            source,
        })?;

        debug!("Mapped {} bytes", map.len());

        Ok(Self { path, map })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.map
    }
}

impl AsRef<[u8]> for MappedFile {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Deref for MappedFile {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}
