use log::debug;
use nom::number::complete::le_u16;

use crate::error::{Error, Result};

use super::{
    coff_header::CoffHeader,
    machine::MachineType,
    msdos_header::MsDosHeader,
    optional_header::{OptionalHeader, OptionalHeader32, OptionalHeader64},
    view,
};

/// Signature plus file header, the part of the PE header every image shares.
const PE_PREFIX_SIZE: usize = CoffHeader::SIGNATURE.len() + CoffHeader::SIZE;

/// Read-only access to the MS-DOS and PE headers of an image held in memory.
///
/// Construction validates both headers and the offset linking them. Nothing
/// is copied out of the view: every accessor decodes its header again through
/// the checked read primitive, and the optional header is only bounds checked
/// when one of its accessors is used.
#[derive(Clone, Copy, Debug)]
pub struct PeHeaderReader<'a> {
    data: &'a [u8],
    pe_offset: usize,
    machine: &'a [u8; 2],
}

impl<'a> PeHeaderReader<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let msdos_header = view::decode(data, 0, MsDosHeader::SIZE, MsDosHeader::parse)?;
        if msdos_header.magic != MsDosHeader::MAGIC {
            return Err(Error::NotExecutableFile {
                magic: msdos_header.magic,
            });
        }

        let pe_offset = msdos_header.pe_offset as usize;
        debug!("PE header offset: {:#x}", pe_offset);

        // The offset comes straight from the file: the whole prefix must fit
        // before the signature is looked at.
        view::read_at(data, pe_offset, PE_PREFIX_SIZE)?;

        let signature = view::read_array::<4>(data, pe_offset)?;
        if signature != CoffHeader::SIGNATURE {
            return Err(Error::NotPEFile { signature });
        }

        let machine = view::read_ref::<2>(data, Self::file_header_offset(pe_offset))?;
        debug!("Machine: {:#06x}", u16::from_le_bytes(*machine));

        Ok(Self {
            data,
            pe_offset,
            machine,
        })
    }

    /// Always succeeds on a reader returned by [`PeHeaderReader::parse`].
    pub fn legacy_header(&self) -> Result<MsDosHeader> {
        view::decode(self.data, 0, MsDosHeader::SIZE, MsDosHeader::parse)
    }

    /// Always succeeds on a reader returned by [`PeHeaderReader::parse`].
    pub fn file_header(&self) -> Result<CoffHeader> {
        view::decode(
            self.data,
            Self::file_header_offset(self.pe_offset),
            CoffHeader::SIZE,
            CoffHeader::parse,
        )
    }

    pub fn machine_type(&self) -> MachineType {
        MachineType::from(u16::from_le_bytes(*self.machine))
    }

    pub fn pe_offset(&self) -> usize {
        self.pe_offset
    }

    fn file_header_offset(pe_offset: usize) -> usize {
        pe_offset + CoffHeader::SIGNATURE.len()
    }

    fn optional_header_offset(&self) -> usize {
        self.pe_offset + PE_PREFIX_SIZE
    }

    /// Reads the optional header as whichever layout its magic selects.
    pub fn optional_header(&self) -> Result<OptionalHeader> {
        let magic = view::decode(self.data, self.optional_header_offset(), 2, le_u16)?;
        debug!("Optional header magic: {:#x}", magic);

        match magic {
            OptionalHeader::PE32_MAGIC => Ok(OptionalHeader::Pe32(self.optional_header32()?)),
            OptionalHeader::PE32_PLUS_MAGIC => {
                Ok(OptionalHeader::Pe32Plus(self.optional_header64()?))
            }
            magic => Err(Error::UnexpectedOptionalHeader { magic }),
        }
    }

    pub fn optional_header32(&self) -> Result<OptionalHeader32> {
        let header = view::decode(
            self.data,
            self.optional_header_offset(),
            OptionalHeader32::SIZE,
            OptionalHeader32::parse,
        )?;

        if header.magic != OptionalHeader::PE32_MAGIC {
            return Err(Error::UnexpectedOptionalHeader {
                magic: header.magic,
            });
        }

        Ok(header)
    }

    pub fn optional_header64(&self) -> Result<OptionalHeader64> {
        let header = view::decode(
            self.data,
            self.optional_header_offset(),
            OptionalHeader64::SIZE,
            OptionalHeader64::parse,
        )?;

        if header.magic != OptionalHeader::PE32_PLUS_MAGIC {
            return Err(Error::UnexpectedOptionalHeader {
                magic: header.magic,
            });
        }

        Ok(header)
    }
}
