use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open {}: {source}", .path.display())]
    FileNotAccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot map {}: {source}", .path.display())]
    MappingFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file truncated: {needed} bytes needed at offset {offset:#x}, file is {length} bytes")]
    TruncatedFile {
        offset: usize,
        needed: usize,
        length: usize,
    },

    #[error("not an executable file (magic {magic:#06x})")]
    NotExecutableFile { magic: u16 },

    #[error("not a PE file (signature {signature:02x?})")]
    NotPEFile { signature: [u8; 4] },

    #[error("unexpected optional header magic {magic:#06x}")]
    UnexpectedOptionalHeader { magic: u16 },
}
