//! Bounds-checked access to a borrowed byte view.
//!
//! Every header field is read through [`read_at`], either directly or via
//! [`decode`], so no offset taken from the file is ever used to index the
//! view without first being checked against its length.

use crate::error::{Error, Result};

use super::FileParseResult;

fn truncated(data: &[u8], offset: usize, len: usize) -> Error {
    Error::TruncatedFile {
        offset,
        needed: len,
        length: data.len(),
    }
}

/// Returns the `len` bytes starting at `offset`.
pub fn read_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| truncated(data, offset, len))?;

    data.get(offset..end)
        .ok_or_else(|| truncated(data, offset, len))
}

/// Borrows the `N` bytes at `offset` as a fixed-size array.
pub fn read_ref<const N: usize>(data: &[u8], offset: usize) -> Result<&[u8; N]> {
    read_at(data, offset, N)?
        .try_into()
        .map_err(|_| truncated(data, offset, N))
}

pub fn read_array<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    read_ref(data, offset).map(|bytes| *bytes)
}

/// Runs `parser` over exactly `len` bytes at `offset`.
///
/// The parser only ever sees the checked slice, so a structure that claims
/// more bytes than `len` fails here as `TruncatedFile` instead of reading past
/// the end of the view.
pub fn decode<'i, T>(
    data: &'i [u8],
    offset: usize,
    len: usize,
    parser: impl FnOnce(&'i [u8]) -> FileParseResult<'i, T>,
) -> Result<T> {
    let bytes = read_at(data, offset, len)?;

    parser(bytes)
        .map(|(_, value)| value)
        .map_err(|_| truncated(data, offset, len))
}

#[cfg(test)]
mod test {
    use super::*;
    use nom::number::complete::{le_u16, le_u32};
    use proptest::prelude::*;

    #[test]
    fn read_at_in_bounds() {
        let data = vec![0x00, 0x01, 0x02, 0x03, 0x04, 0x05];

        assert_eq!(read_at(&data, 0, 6).unwrap(), &data[..]);
        assert_eq!(read_at(&data, 2, 3).unwrap(), &[0x02, 0x03, 0x04]);
        assert_eq!(read_at(&data, 6, 0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn read_at_out_of_bounds() {
        let data = vec![0u8; 8];

        assert!(matches!(
            read_at(&data, 6, 4),
            Err(Error::TruncatedFile {
                offset: 6,
                needed: 4,
                length: 8
            })
        ));
        assert!(matches!(
            read_at(&data, 9, 0),
            Err(Error::TruncatedFile { .. })
        ));
        assert!(matches!(
            read_at(&data, usize::MAX, 2),
            Err(Error::TruncatedFile { .. })
        ));
    }

    #[test]
    fn read_array_copies_bytes() {
        let data = b"xxPE\0\0yy";

        assert_eq!(read_array::<4>(data, 2).unwrap(), *b"PE\0\0");
        assert_eq!(read_array::<4>(data, 6).is_err(), true);
    }

    #[test]
    fn read_ref_borrows_view() {
        let data = vec![0x4c, 0x01, 0x64, 0x86];

        let bytes = read_ref::<2>(&data, 2).unwrap();
        assert_eq!(bytes, &[0x64, 0x86]);
        assert!(std::ptr::eq(bytes.as_ptr(), data[2..].as_ptr()));

        assert!(matches!(
            read_ref::<2>(&data, 3),
            Err(Error::TruncatedFile {
                offset: 3,
                needed: 2,
                length: 4
            })
        ));
    }

    #[test]
    fn decode_limits_parser_input() {
        let data = vec![0x34, 0x12, 0x78, 0x56, 0xff, 0xff];

        assert_eq!(decode(&data, 0, 2, le_u16).unwrap(), 0x1234);
        assert_eq!(decode(&data, 2, 4, le_u32).unwrap(), 0xffff5678);

        // The parser wants four bytes but is only handed two.
        assert!(matches!(
            decode(&data, 0, 2, le_u32),
            Err(Error::TruncatedFile {
                offset: 0,
                needed: 2,
                ..
            })
        ));
    }

    proptest! {
        #[test]
        fn read_at_never_escapes_the_view(
            data in proptest::collection::vec(any::<u8>(), 0..256),
            offset in any::<usize>(),
            len in 0usize..512,
        ) {
            match read_at(&data, offset, len) {
                Ok(bytes) => {
                    prop_assert_eq!(bytes.len(), len);
                    prop_assert!(offset + len <= data.len());
                }
                Err(Error::TruncatedFile { length, .. }) => prop_assert_eq!(length, data.len()),
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
        }
    }
}
