use nom::{
    bytes::complete::take,
    number::complete::{le_u16, le_u32},
    sequence::tuple,
};

use super::FileParseResult;

/// The legacy MS-DOS stub header at the start of every PE image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MsDosHeader {
    pub magic: u16,
    pub bytes_on_last_page: u16,
    pub pages_in_file: u16,
    pub relocations: u16,
    pub header_paragraphs: u16,
    pub min_extra_paragraphs: u16,
    pub max_extra_paragraphs: u16,
    pub initial_ss: u16,
    pub initial_sp: u16,
    pub checksum: u16,
    pub initial_ip: u16,
    pub initial_cs: u16,
    pub relocation_table_offset: u16,
    pub overlay_number: u16,
    pub oem_id: u16,
    pub oem_info: u16,
    pub pe_offset: u32,
}

impl MsDosHeader {
    pub const SIZE: usize = 64;

    /// "MZ"
    pub const MAGIC: u16 = 0x5a4d;

    pub fn parse(input: &[u8]) -> FileParseResult<Self> {
        let (
            input,
            (
                magic,
                bytes_on_last_page,
                pages_in_file,
                relocations,
                header_paragraphs,
                min_extra_paragraphs,
                max_extra_paragraphs,
                initial_ss,
                initial_sp,
                checksum,
                initial_ip,
                initial_cs,
                relocation_table_offset,
                overlay_number,
            ),
        ) = tuple((
            le_u16, le_u16, le_u16, le_u16, le_u16, le_u16, le_u16, le_u16, le_u16, le_u16,
            le_u16, le_u16, le_u16, le_u16,
        ))(input)?;

        let (input, (_, oem_id, oem_info, _, pe_offset)) =
            tuple((take(8_usize), le_u16, le_u16, take(20_usize), le_u32))(input)?;

        Ok((
            input,
            MsDosHeader {
                magic,
                bytes_on_last_page,
                pages_in_file,
                relocations,
                header_paragraphs,
                min_extra_paragraphs,
                max_extra_paragraphs,
                initial_ss,
                initial_sp,
                checksum,
                initial_ip,
                initial_cs,
                relocation_table_offset,
                overlay_number,
                oem_id,
                oem_info,
                pe_offset,
            },
        ))
    }
}
