mod coff_header;
mod header_reader;
mod machine;
mod msdos_header;
mod optional_header;
mod view;

pub use coff_header::CoffHeader;
pub use header_reader::PeHeaderReader;
pub use machine::MachineType;
pub use msdos_header::MsDosHeader;
pub use optional_header::{
    DataDirectory, ImageLayout, OptionalHeader, OptionalHeader32, OptionalHeader64,
};

pub type FileParseResult<'i, T> = nom::IResult<&'i [u8], T>;
