//! # retrocomp
//!
//! A small archival compressor built on static, per-block canonical Huffman
//! coding over the 256-byte alphabet.
//! * `archive` is the from-scratch idiomatic implementation: entry/block
//!   framing, the archive container, and buffer/stream convenience wrappers.
//! * `direct_ports::comp` is a nearly direct port of the original "Very basic
//!   Huffman compressor/decompressor" by theduffman100, kept alongside
//!   `archive` as a structurally faithful fixed point.
//!
//! `archive`'s entry points are generics over `std::io::Read`/`std::io::Write`
//! so the same code serves files, pipes, or in-memory buffers. There are
//! convenience functions for working directly with buffers.
//!
//! ## File Example
//!
//! ```rs
//! use retrocomp::archive;
//! let mut in_file = std::fs::File::open("some_input_path").expect("open failed");
//! let mut out_file = std::fs::File::create("some_output_path").expect("create failed");
//! archive::pack(&mut out_file, [("some_input_path".to_string(), &mut in_file)])
//!     .expect("compression failed");
//! ```
//!
//! ## Buffer Example
//!
//! ```rs
//! use retrocomp::archive;
//! let test_data = "This is the chaunt of the priests.  The chaunt of the priests of Mung.".as_bytes();
//! let packed = archive::compress_slice(&[("greeting.txt", test_data)]).expect("compression failed");
//! let unpacked = archive::decompress_slice(&packed).expect("extraction failed");
//! ```

mod tools;
mod huffman;
pub mod archive;
pub mod direct_ports;

#[allow(dead_code)]
type DYNERR = Box<dyn std::error::Error>;
#[allow(dead_code)]
type STDRESULT = Result<(), Box<dyn std::error::Error>>;

/// Crate errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("bad archive magic")]
    BadMagic,
    #[error("bit stream ended before the expected data")]
    Truncated,
    #[error("block declares more symbols than the format allows")]
    OversizeLength,
    #[error("entry name length out of range")]
    BadNameLength,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
