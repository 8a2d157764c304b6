//! Reads the MS-DOS and PE headers of a Windows executable to find the
//! architecture it was built for.

pub mod error;
pub mod mapped_file;
pub mod pe;

pub use error::{Error, Result};
pub use mapped_file::MappedFile;
pub use pe::{MachineType, PeHeaderReader};
