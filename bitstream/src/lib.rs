//! Bounded buffer cursor for the netvar codec.
//!
//! This crate provides [`BitWriter`] and [`BitReader`], the sequential
//! read/write primitives every replication strategy encodes against.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - Every read/write checks capacity first and
//!   fails instead of truncating or overrunning.
//! - **Seekable** - Writers can reserve a prefix and patch it later, which is
//!   how length-prefixed frames are produced in a single buffer.
//! - **No domain knowledge** - This crate knows nothing about replicated values.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//!
//! let mut buf = [0u8; 16];
//! let mut writer = BitWriter::new(&mut buf);
//! writer.write_bit(true).unwrap();
//! writer.write_bits(42, 7).unwrap();
//! writer.write_varu64(300).unwrap();
//! let used = writer.finish();
//!
//! let mut reader = BitReader::new(&buf[..used]);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_bits(7).unwrap(), 42);
//! assert_eq!(reader.read_varu64().unwrap(), 300);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use reader::BitReader;
pub use writer::{varu64_len, BitWriter};
