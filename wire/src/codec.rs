use crate::{
    buffer::{WireReader, WireWriter},
    error::WireError,
};

/// Width of the length prefix in front of strings and sequences.
pub const LENGTH_PREFIX: usize = 4;

/// A value with a fixed binary wire layout.
///
/// Implemented here for every primitive a schema can name, for `String`,
/// `Vec<T>` and `[T; N]`. Generated records implement it field by field.
pub trait Wire: Sized {
    /// Smallest possible encoding of a value, in bytes.
    const MIN_ENCODED_LEN: usize;

    fn encode_to(&self, writer: &mut WireWriter) -> Result<(), WireError>;
    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, WireError>;
}

macro_rules! impl_wire_int {
    ($($ty:ty => $write:ident, $read:ident;)*) => {$(
        impl Wire for $ty {
            const MIN_ENCODED_LEN: usize = std::mem::size_of::<$ty>();

            fn encode_to(&self, writer: &mut WireWriter) -> Result<(), WireError> {
                writer.$write(*self);
                Ok(())
            }

            fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
                reader.$read()
            }
        }
    )*};
}

impl_wire_int! {
    u8   => write_u8,   read_u8;
    i8   => write_i8,   read_i8;
    u16  => write_u16,  read_u16;
    u32  => write_u32,  read_u32;
    i32  => write_i32,  read_i32;
    u64  => write_u64,  read_u64;
    i64  => write_i64,  read_i64;
    bool => write_bool, read_bool;
}

impl Wire for String {
    const MIN_ENCODED_LEN: usize = LENGTH_PREFIX;

    fn encode_to(&self, writer: &mut WireWriter) -> Result<(), WireError> {
        writer.write_string(self)
    }

    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        reader.read_string()
    }
}

/// Element count as `u32`, then the elements.
impl<T: Wire> Wire for Vec<T> {
    const MIN_ENCODED_LEN: usize = LENGTH_PREFIX;

    fn encode_to(&self, writer: &mut WireWriter) -> Result<(), WireError> {
        writer.write_len(self.len())?;
        for item in self {
            item.encode_to(writer)?;
        }
        Ok(())
    }

    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        let count = reader.read_len()?;
        // a count the rest of the buffer cannot hold fails before decoding
        // anything; zero-width elements are only bounded by the u32 count
        reader.ensure(count.saturating_mul(T::MIN_ENCODED_LEN))?;
        let mut items = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            items.push(T::decode_from(reader)?);
        }
        Ok(items)
    }
}

/// `N` elements back to back, no prefix.
impl<T: Wire, const N: usize> Wire for [T; N] {
    const MIN_ENCODED_LEN: usize = T::MIN_ENCODED_LEN.saturating_mul(N);

    fn encode_to(&self, writer: &mut WireWriter) -> Result<(), WireError> {
        for item in self {
            item.encode_to(writer)?;
        }
        Ok(())
    }

    fn decode_from(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        reader.ensure(Self::MIN_ENCODED_LEN)?;
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::decode_from(reader)?);
        }
        items
            .try_into()
            .map_err(|items: Vec<T>| WireError::LengthOverflow(items.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: Wire + PartialEq + std::fmt::Debug>(value: T) -> Vec<u8> {
        let mut writer = WireWriter::new();
        value.encode_to(&mut writer).unwrap();
        let bytes = writer.into_bytes();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(T::decode_from(&mut reader).unwrap(), value);
        assert_eq!(reader.remaining(), 0);
        bytes
    }

    #[test]
    fn primitive_widths() {
        assert_eq!(round_trip(7u8).len(), 1);
        assert_eq!(round_trip(-7i8).len(), 1);
        assert_eq!(round_trip(true).len(), 1);
        assert_eq!(round_trip(u16::MAX).len(), 2);
        assert_eq!(round_trip(u32::MAX).len(), 4);
        assert_eq!(round_trip(i32::MIN).len(), 4);
        assert_eq!(round_trip(u64::MAX).len(), 8);
        assert_eq!(round_trip(i64::MIN).len(), 8);
    }

    #[test]
    fn byte_array_is_contiguous_without_prefix() {
        let bytes = round_trip([1u8, 2, 3, 4]);
        assert_eq!(bytes, [1, 2, 3, 4]);
    }

    #[test]
    fn array_of_strings() {
        let bytes = round_trip(["a".to_string(), "bc".to_string()]);
        assert_eq!(bytes, [1, 0, 0, 0, b'a', 2, 0, 0, 0, b'b', b'c']);
    }

    #[test]
    fn sequence_is_count_prefixed() {
        let bytes = round_trip(vec![1u32, 2]);
        assert_eq!(bytes, [2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]);
        assert_eq!(round_trip(Vec::<u64>::new()), [0, 0, 0, 0]);
        round_trip(vec![vec![true], vec![], vec![false, true]]);
    }

    #[test]
    fn sequence_with_oversized_count_is_truncated() {
        let mut reader = WireReader::new(&[0xff, 0xff, 0xff, 0xff, 1]);
        let err = Vec::<u8>::decode_from(&mut reader).unwrap_err();
        assert_eq!(err, WireError::TruncatedBuffer { offset: 4, needed: u32::MAX as usize, remaining: 1 });

        // two strings need at least their two length prefixes
        let mut reader = WireReader::new(&[2, 0, 0, 0, 0, 0, 0, 0, 0]);
        let err = Vec::<String>::decode_from(&mut reader).unwrap_err();
        assert_eq!(err, WireError::TruncatedBuffer { offset: 4, needed: 8, remaining: 5 });
    }

    #[test]
    fn zero_width_elements_need_no_bytes() {
        let mut reader = WireReader::new(&[3, 0, 0, 0]);
        assert_eq!(Vec::<[u8; 0]>::decode_from(&mut reader), Ok(vec![[]; 3]));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn min_encoded_lens() {
        assert_eq!(<u8 as Wire>::MIN_ENCODED_LEN, 1);
        assert_eq!(<bool as Wire>::MIN_ENCODED_LEN, 1);
        assert_eq!(<i64 as Wire>::MIN_ENCODED_LEN, 8);
        assert_eq!(<String as Wire>::MIN_ENCODED_LEN, 4);
        assert_eq!(<Vec<u64> as Wire>::MIN_ENCODED_LEN, 4);
        assert_eq!(<[u16; 3] as Wire>::MIN_ENCODED_LEN, 6);
        assert_eq!(<[[u8; 0]; 7] as Wire>::MIN_ENCODED_LEN, 0);
    }

    #[test]
    fn truncated_array() {
        let mut reader = WireReader::new(&[1, 0, 2]);
        assert!(matches!(
            <[u16; 2]>::decode_from(&mut reader),
            Err(WireError::TruncatedBuffer { offset: 0, needed: 4, remaining: 3 })
        ));
    }
}
