use nom::{
    bytes::complete::take,
    multi::count,
    number::complete::{le_u16, le_u32, le_u64, le_u8},
    sequence::tuple,
};

use super::FileParseResult;

pub const NUMBER_OF_DIRECTORIES: usize = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataDirectory {
    pub rva: u32,
    pub size: u32,
}

impl DataDirectory {
    pub const IMPORT_TABLE: usize = 1;
    pub const RESOURCE_TABLE: usize = 2;

    fn parse(input: &[u8]) -> FileParseResult<Self> {
        let (input, (rva, size)) = tuple((le_u32, le_u32))(input)?;
        Ok((input, DataDirectory { rva, size }))
    }

    fn parse_table(input: &[u8], number_of_rva_and_sizes: u32) -> FileParseResult<Vec<Self>> {
        let (input, mut directories) = count(DataDirectory::parse, NUMBER_OF_DIRECTORIES)(input)?;

        // Slots past the declared count are not part of the table.
        directories.truncate(number_of_rva_and_sizes as usize);

        Ok((input, directories))
    }
}

/// Fields laid out identically in PE32 and PE32+ optional headers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageLayout {
    pub section_alignment: u32,
    pub file_alignment: u32,
    pub size_of_image: u32,
    pub size_of_headers: u32,
    pub checksum: u32,
    pub subsystem: u16,
    pub dll_characteristics: u16,
}

impl ImageLayout {
    fn parse(input: &[u8]) -> FileParseResult<Self> {
        // The operating system, image and subsystem versions and the reserved
        // Win32 version value are skipped.
        let (
            input,
            (
                section_alignment,
                file_alignment,
                _,
                size_of_image,
                size_of_headers,
                checksum,
                subsystem,
                dll_characteristics,
            ),
        ) = tuple((
            le_u32,
            le_u32,
            take(16_usize),
            le_u32,
            le_u32,
            le_u32,
            le_u16,
            le_u16,
        ))(input)?;

        Ok((
            input,
            ImageLayout {
                section_alignment,
                file_alignment,
                size_of_image,
                size_of_headers,
                checksum,
                subsystem,
                dll_characteristics,
            },
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionalHeader32 {
    pub magic: u16,
    pub major_linker_version: u8,
    pub minor_linker_version: u8,
    pub size_of_code: u32,
    pub size_of_initialized_data: u32,
    pub size_of_uninitialized_data: u32,
    pub address_of_entry_point: u32,
    pub base_of_code: u32,
    pub base_of_data: u32,
    pub image_base: u32,
    pub layout: ImageLayout,
    pub size_of_stack_reserve: u32,
    pub size_of_stack_commit: u32,
    pub size_of_heap_reserve: u32,
    pub size_of_heap_commit: u32,
    pub loader_flags: u32,
    pub number_of_rva_and_sizes: u32,
    pub data_directories: Vec<DataDirectory>,
}

impl OptionalHeader32 {
    pub const SIZE: usize = 224;

    pub fn parse(input: &[u8]) -> FileParseResult<Self> {
        let (
            input,
            (
                magic,
                major_linker_version,
                minor_linker_version,
                size_of_code,
                size_of_initialized_data,
                size_of_uninitialized_data,
                address_of_entry_point,
                base_of_code,
                base_of_data,
                image_base,
            ),
        ) = tuple((
            le_u16, le_u8, le_u8, le_u32, le_u32, le_u32, le_u32, le_u32, le_u32, le_u32,
        ))(input)?;

        let (input, layout) = ImageLayout::parse(input)?;

        let (
            input,
            (
                size_of_stack_reserve,
                size_of_stack_commit,
                size_of_heap_reserve,
                size_of_heap_commit,
                loader_flags,
                number_of_rva_and_sizes,
            ),
        ) = tuple((le_u32, le_u32, le_u32, le_u32, le_u32, le_u32))(input)?;

        let (input, data_directories) =
            DataDirectory::parse_table(input, number_of_rva_and_sizes)?;

        Ok((
            input,
            OptionalHeader32 {
                magic,
                major_linker_version,
                minor_linker_version,
                size_of_code,
                size_of_initialized_data,
                size_of_uninitialized_data,
                address_of_entry_point,
                base_of_code,
                base_of_data,
                image_base,
                layout,
                size_of_stack_reserve,
                size_of_stack_commit,
                size_of_heap_reserve,
                size_of_heap_commit,
                loader_flags,
                number_of_rva_and_sizes,
                data_directories,
            },
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionalHeader64 {
    pub magic: u16,
    pub major_linker_version: u8,
    pub minor_linker_version: u8,
    pub size_of_code: u32,
    pub size_of_initialized_data: u32,
    pub size_of_uninitialized_data: u32,
    pub address_of_entry_point: u32,
    pub base_of_code: u32,
    pub image_base: u64,
    pub layout: ImageLayout,
    pub size_of_stack_reserve: u64,
    pub size_of_stack_commit: u64,
    pub size_of_heap_reserve: u64,
    pub size_of_heap_commit: u64,
    pub loader_flags: u32,
    pub number_of_rva_and_sizes: u32,
    pub data_directories: Vec<DataDirectory>,
}

impl OptionalHeader64 {
    pub const SIZE: usize = 240;

    pub fn parse(input: &[u8]) -> FileParseResult<Self> {
        let (
            input,
            (
                magic,
                major_linker_version,
                minor_linker_version,
                size_of_code,
                size_of_initialized_data,
                size_of_uninitialized_data,
                address_of_entry_point,
                base_of_code,
                image_base,
            ),
        ) = tuple((
            le_u16, le_u8, le_u8, le_u32, le_u32, le_u32, le_u32, le_u32, le_u64,
        ))(input)?;

        let (input, layout) = ImageLayout::parse(input)?;

        let (
            input,
            (
                size_of_stack_reserve,
                size_of_stack_commit,
                size_of_heap_reserve,
                size_of_heap_commit,
                loader_flags,
                number_of_rva_and_sizes,
            ),
        ) = tuple((le_u64, le_u64, le_u64, le_u64, le_u32, le_u32))(input)?;

        let (input, data_directories) =
            DataDirectory::parse_table(input, number_of_rva_and_sizes)?;

        Ok((
            input,
            OptionalHeader64 {
                magic,
                major_linker_version,
                minor_linker_version,
                size_of_code,
                size_of_initialized_data,
                size_of_uninitialized_data,
                address_of_entry_point,
                base_of_code,
                image_base,
                layout,
                size_of_stack_reserve,
                size_of_stack_commit,
                size_of_heap_reserve,
                size_of_heap_commit,
                loader_flags,
                number_of_rva_and_sizes,
                data_directories,
            },
        ))
    }
}

/// Optional header, tagged by the magic word at its start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionalHeader {
    Pe32(OptionalHeader32),
    Pe32Plus(OptionalHeader64),
}

impl OptionalHeader {
    pub const PE32_MAGIC: u16 = 0x10b;
    pub const PE32_PLUS_MAGIC: u16 = 0x20b;

    pub fn magic(&self) -> u16 {
        match self {
            OptionalHeader::Pe32(header) => header.magic,
            OptionalHeader::Pe32Plus(header) => header.magic,
        }
    }

    pub fn is_64bit(&self) -> bool {
        matches!(self, OptionalHeader::Pe32Plus(_))
    }

    pub fn address_of_entry_point(&self) -> u32 {
        match self {
            OptionalHeader::Pe32(header) => header.address_of_entry_point,
            OptionalHeader::Pe32Plus(header) => header.address_of_entry_point,
        }
    }

    pub fn image_base(&self) -> u64 {
        match self {
            OptionalHeader::Pe32(header) => header.image_base as u64,
            OptionalHeader::Pe32Plus(header) => header.image_base,
        }
    }

    pub fn layout(&self) -> &ImageLayout {
        match self {
            OptionalHeader::Pe32(header) => &header.layout,
            OptionalHeader::Pe32Plus(header) => &header.layout,
        }
    }

    pub fn subsystem(&self) -> u16 {
        self.layout().subsystem
    }

    pub fn data_directories(&self) -> &[DataDirectory] {
        match self {
            OptionalHeader::Pe32(header) => &header.data_directories,
            OptionalHeader::Pe32Plus(header) => &header.data_directories,
        }
    }

    pub fn data_directory(&self, index: usize) -> Option<&DataDirectory> {
        self.data_directories().get(index)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn put(data: &mut [u8], offset: usize, bytes: &[u8]) {
        data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    #[test]
    fn optional_header_32() {
        let mut data = vec![0u8; OptionalHeader32::SIZE];
        put(&mut data, 0, &OptionalHeader::PE32_MAGIC.to_le_bytes());
        put(&mut data, 2, &[14, 29]);
        put(&mut data, 16, &0x1234u32.to_le_bytes());
        put(&mut data, 24, &0x3000u32.to_le_bytes());
        put(&mut data, 28, &0x0040_0000u32.to_le_bytes());
        put(&mut data, 32, &0x1000u32.to_le_bytes());
        put(&mut data, 36, &0x200u32.to_le_bytes());
        put(&mut data, 56, &0x8000u32.to_le_bytes());
        put(&mut data, 68, &3u16.to_le_bytes());
        put(&mut data, 70, &0x8140u16.to_le_bytes());
        put(&mut data, 72, &0x10_0000u32.to_le_bytes());
        put(&mut data, 92, &16u32.to_le_bytes());
        put(&mut data, 104, &0x2000u32.to_le_bytes());
        put(&mut data, 108, &0x50u32.to_le_bytes());

        let (remaining, header) = OptionalHeader32::parse(&data).unwrap();

        assert_eq!(remaining.len(), 0);
        assert_eq!(header.magic, OptionalHeader::PE32_MAGIC);
        assert_eq!(header.major_linker_version, 14);
        assert_eq!(header.minor_linker_version, 29);
        assert_eq!(header.address_of_entry_point, 0x1234);
        assert_eq!(header.base_of_data, 0x3000);
        assert_eq!(header.image_base, 0x0040_0000);
        assert_eq!(
            header.layout,
            ImageLayout {
                section_alignment: 0x1000,
                file_alignment: 0x200,
                size_of_image: 0x8000,
                size_of_headers: 0,
                checksum: 0,
                subsystem: 3,
                dll_characteristics: 0x8140,
            }
        );
        assert_eq!(header.size_of_stack_reserve, 0x10_0000);
        assert_eq!(header.number_of_rva_and_sizes, 16);
        assert_eq!(header.data_directories.len(), NUMBER_OF_DIRECTORIES);
        assert_eq!(
            header.data_directories[DataDirectory::IMPORT_TABLE],
            DataDirectory {
                rva: 0x2000,
                size: 0x50
            }
        );

        assert_eq!(OptionalHeader32::parse(&data[..223]).is_err(), true);
    }

    #[test]
    fn optional_header_64() {
        let mut data = vec![0u8; OptionalHeader64::SIZE];
        put(&mut data, 0, &OptionalHeader::PE32_PLUS_MAGIC.to_le_bytes());
        put(&mut data, 16, &0x1_4a0u32.to_le_bytes());
        put(&mut data, 24, &0x1_4000_0000u64.to_le_bytes());
        put(&mut data, 68, &2u16.to_le_bytes());
        put(&mut data, 72, &0x10_0000u64.to_le_bytes());
        put(&mut data, 80, &0x1000u64.to_le_bytes());
        put(&mut data, 108, &2u32.to_le_bytes());
        put(&mut data, 112, &0x10u32.to_le_bytes());
        put(&mut data, 120, &0x20u32.to_le_bytes());
        put(&mut data, 128, &0x30u32.to_le_bytes());

        let (remaining, header) = OptionalHeader64::parse(&data).unwrap();

        assert_eq!(remaining.len(), 0);
        assert_eq!(header.address_of_entry_point, 0x14a0);
        assert_eq!(header.image_base, 0x1_4000_0000);
        assert_eq!(header.layout.subsystem, 2);
        assert_eq!(header.size_of_stack_reserve, 0x10_0000);
        assert_eq!(header.size_of_stack_commit, 0x1000);

        // Only the declared number of directories is kept.
        assert_eq!(
            header.data_directories,
            vec![
                DataDirectory { rva: 0x10, size: 0 },
                DataDirectory { rva: 0x20, size: 0 },
            ]
        );

        let header = OptionalHeader::Pe32Plus(header);
        assert_eq!(header.is_64bit(), true);
        assert_eq!(header.image_base(), 0x1_4000_0000);
        assert_eq!(header.subsystem(), 2);
        assert_eq!(header.data_directory(DataDirectory::RESOURCE_TABLE), None);

        assert_eq!(OptionalHeader64::parse(&data[..239]).is_err(), true);
    }
}
