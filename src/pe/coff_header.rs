use nom::{
    number::complete::{le_u16, le_u32},
    sequence::tuple,
};

use super::{FileParseResult, MachineType};

/// The COFF file header that follows the `PE\0\0` signature.
///
/// Its layout is the same for PE32 and PE32+ images.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoffHeader {
    pub machine: u16,
    pub number_of_sections: u16,
    pub time_date_stamp: u32,
    pub pointer_to_symbol_table: u32,
    pub number_of_symbols: u32,
    pub size_of_optional_header: u16,
    pub characteristics: u16,
}

impl CoffHeader {
    pub const SIGNATURE: [u8; 4] = *b"PE\0\0";
    pub const SIZE: usize = 20;

    pub fn parse(input: &[u8]) -> FileParseResult<Self> {
        let (
            input,
            (
                machine,
                number_of_sections,
                time_date_stamp,
                pointer_to_symbol_table,
                number_of_symbols,
                size_of_optional_header,
                characteristics,
            ),
        ) = tuple((le_u16, le_u16, le_u32, le_u32, le_u32, le_u16, le_u16))(input)?;

        Ok((
            input,
            CoffHeader {
                machine,
                number_of_sections,
                time_date_stamp,
                pointer_to_symbol_table,
                number_of_symbols,
                size_of_optional_header,
                characteristics,
            },
        ))
    }

    pub fn machine_type(&self) -> MachineType {
        MachineType::from(self.machine)
    }
}
