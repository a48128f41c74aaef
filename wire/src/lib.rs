//! Runtime support for records generated from Chateau schemas.
//!
//! The wire layout is fixed: little-endian integers, `bool` as one byte,
//! strings and growable sequences prefixed with a `u32` length, fixed arrays
//! written back to back without a prefix.
//!
//! ```
//! use chateau_wire::*;
//!
//! let mut writer = WireWriter::new();
//! vec![1u16, 2].encode_to(&mut writer).unwrap();
//! let bytes = writer.into_bytes();
//! assert_eq!(bytes, [2, 0, 0, 0, 1, 0, 2, 0]);
//!
//! let mut reader = WireReader::new(&bytes);
//! assert_eq!(Vec::<u16>::decode_from(&mut reader), Ok(vec![1, 2]));
//! ```

pub mod buffer;
pub mod codec;
pub mod error;

pub use buffer::*;
pub use codec::*;
pub use error::*;
