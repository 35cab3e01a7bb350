//! Very Basic Huffman Compressor/Decompressor
//!
//! This is mostly a direct port of the C program `comp.c`, "Very basic
//! Huffman compressor/decompressor", by theduffman100.
//!
//! Differences from `comp.c`:
//! * File handling is replaced with in-memory buffers (`Vec<u8>`/`&[u8]`)
//! * Comments are expanded and identifiers are given longer names
//! * The priority queue and bit stream are gathered into structs
//!
//! Unlike `archive`, this module assigns every one of the 256 symbols
//! whatever depth falls naturally out of the merge, including symbols that
//! never appear in the block - it does not override their length to zero.
//! That is the original algorithm's actual behavior; the entry is simply
//! never reached while encoding or decoding since the symbol never occurs.
//!
//! If you need the idiomatic, `Read`/`Write`-based implementation with
//! error handling instead of panics, use `retrocomp::archive`.

const ALPHABET: i64 = 256;

struct PriorityQueue {
    top: i64,
    data: Vec<i64>,
    priority: Vec<i64>,
}

impl PriorityQueue {
    fn init(nbr: i64) -> Self {
        Self {
            top: 1,
            data: vec![0; (nbr + 2) as usize],
            priority: vec![0; (nbr + 2) as usize],
        }
    }

    fn put(&mut self, data: i64, priority: i64) {
        let mut i2 = self.top;
        self.top += 1;
        while i2 > 1 {
            let i3 = i2 >> 1;
            if self.priority[i3 as usize] > priority {
                break;
            }
            self.priority[i2 as usize] = self.priority[i3 as usize];
            self.data[i2 as usize] = self.data[i3 as usize];
            i2 = i3;
        }
        self.priority[i2 as usize] = priority;
        self.data[i2 as usize] = data;
    }

    fn get(&mut self) -> i64 {
        let ret = self.data[1];
        self.data[0] = self.data[1];
        self.priority[0] = self.priority[1];
        if self.top <= 1 {
            return -1;
        }
        self.top -= 1;
        let mut i2: i64 = 1;
        loop {
            let mut i3 = i2 << 1;
            if i3 >= self.top {
                break;
            }
            if self.priority[i3 as usize] < self.priority[(i3 + 1) as usize] {
                i3 += 1;
            }
            if self.priority[i3 as usize] <= self.priority[self.top as usize] {
                break;
            }
            self.data[i2 as usize] = self.data[i3 as usize];
            self.priority[i2 as usize] = self.priority[i3 as usize];
            i2 = i3;
        }
        self.data[i2 as usize] = self.data[self.top as usize];
        self.priority[i2 as usize] = self.priority[self.top as usize];
        ret
    }
}

/// A sink that accumulates bits and appends whole bytes to `out` as they fill.
struct BitWriter<'a> {
    out: &'a mut Vec<u8>,
    cur_char: i64,
    n_bit: i64,
}

impl<'a> BitWriter<'a> {
    fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out, cur_char: 0, n_bit: 0 }
    }

    fn put_bits(&mut self, val: i64, mut n_bit: i64) {
        while n_bit > 0 {
            if self.n_bit == 8 {
                self.out.push(self.cur_char as u8);
                self.cur_char = 0;
                self.n_bit = 0;
            }
            let mut to_send = 8 - self.n_bit;
            if to_send > n_bit {
                to_send = n_bit;
            }
            let val_send = (val >> (n_bit - to_send)) & ((1i64 << n_bit) - 1);
            self.cur_char |= val_send << (8 - self.n_bit - to_send);
            self.n_bit += to_send;
            n_bit -= to_send;
        }
    }

    /// Pads the partial byte, if any, and resets. Mirrors `closeBits`
    /// (comp.c:312,318), which the reference calls once per block so that
    /// every block starts the next one byte-aligned.
    fn flush(&mut self) {
        if self.n_bit > 0 {
            self.out.push(self.cur_char as u8);
            self.cur_char = 0;
            self.n_bit = 0;
        }
    }

    fn close(mut self) {
        self.flush();
    }
}

/// A source that refills one byte at a time from a slice and hands out bits.
/// Mirrors `getBits`: returns -1 once the slice is exhausted mid-read.
struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    cur_char: i64,
    n_bit: i64,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, cur_char: 0, n_bit: 0 }
    }

    fn get_bits(&mut self, mut n_bit: i64) -> i64 {
        let mut ret: i64 = 0;
        while n_bit > 0 {
            let mut to_get = self.n_bit;
            if to_get == 0 {
                if self.pos >= self.data.len() {
                    return -1;
                }
                self.cur_char = self.data[self.pos] as i64;
                self.pos += 1;
                to_get = 8;
                self.n_bit = 8;
            }
            if n_bit < to_get {
                to_get = n_bit;
            }
            ret <<= to_get;
            ret |= (self.cur_char >> (self.n_bit - to_get)) & ((1i64 << to_get) - 1);
            n_bit -= to_get;
            self.n_bit -= to_get;
        }
        ret
    }
}

/// Generates optimal code lengths for the given frequencies using the same
/// priority-queue merge as the reference: every symbol, including those with
/// zero frequency, is seeded and merged, so every symbol ends up with the
/// leaf depth the merge happens to give it.
fn generate_length(freq: &[i64; 256]) -> [i64; 256] {
    let nbr = ALPHABET;
    let mut parent = vec![0i64; (2 * nbr) as usize];
    let mut prio = PriorityQueue::init(2 * nbr);
    for (idx, &f) in freq.iter().enumerate() {
        prio.put(idx as i64, -f);
    }

    let mut i = nbr;
    while prio.top > 2 {
        let c1 = prio.get();
        let mut f = prio.priority[0];
        parent[c1 as usize] = i;
        let c2 = prio.get();
        f += prio.priority[0];
        parent[c2 as usize] = i;
        prio.put(i, f - 1);
        i += 1;
    }
    i -= 1;
    parent[i as usize] = 0;
    i -= 1;
    while i >= 0 {
        parent[i as usize] = parent[parent[i as usize] as usize] + 1;
        i -= 1;
    }

    let mut length = [0i64; 256];
    length.copy_from_slice(&parent[..256]);
    length
}

/// Generates canonical prefix codes from code lengths, longest first.
fn generate_prefix(length: &[i64; 256]) -> [i64; 256] {
    let nbr = ALPHABET;
    let mut prio = PriorityQueue::init(nbr);
    for (idx, &len) in length.iter().enumerate() {
        if len > 0 {
            prio.put(idx as i64, len * nbr + idx as i64);
        }
    }

    let mut table = [0i64; 256];
    let mut i = prio.get();
    let mut nbr_pre = length[i as usize];
    let mut code_pre: i64 = 0;
    table[i as usize] = code_pre;
    while prio.top > 1 {
        i = prio.get();
        code_pre = (code_pre >> (nbr_pre - length[i as usize])) + 1;
        nbr_pre = length[i as usize];
        table[i as usize] = code_pre;
    }
    table
}

/// Writes one block: count, 256-entry 4-bit length header, packed codes,
/// then pads out to a byte boundary so the next block (or the caller's
/// terminator) starts byte-aligned, exactly as `writeHBuffer` creates a
/// fresh `BitStream` and calls `closeBits` per block (comp.c:312,318).
fn write_hbuffer(writer: &mut BitWriter, buffer: &[u8]) {
    let mut freq = [0i64; 256];
    for &b in buffer {
        freq[b as usize] += 1;
    }
    let length = generate_length(&freq);
    let code = generate_prefix(&length);
    writer.put_bits(buffer.len() as i64, 16);
    for &len in length.iter() {
        writer.put_bits(len, 4);
    }
    for &b in buffer {
        writer.put_bits(code[b as usize], length[b as usize]);
    }
    writer.flush();
}

#[derive(Clone, Copy)]
struct DecodeNode {
    n0: i64,
    n1: i64,
}

/// Builds a tree-structured lookup table for Huffman codes. An index smaller
/// than `nbr` refers to another node; an index `>= nbr` refers to a
/// character (subtract `nbr`).
fn build_decode_table(code: &[i64; 256], length: &[i64; 256]) -> Vec<DecodeNode> {
    let nbr = ALPHABET;
    let mut decode = vec![DecodeNode { n0: -1, n1: -1 }; 256];
    let mut top: i64 = 1;
    for i in 0..256i64 {
        let mut cur: i64 = 0;
        let mut j = length[i as usize] - 1;
        while j > 0 {
            if (code[i as usize] >> j) & 1 == 1 {
                if decode[cur as usize].n1 < 0 {
                    decode[top as usize] = DecodeNode { n0: -1, n1: -1 };
                    decode[cur as usize].n1 = top;
                    top += 1;
                }
                cur = decode[cur as usize].n1;
            } else {
                if decode[cur as usize].n0 < 0 {
                    decode[top as usize] = DecodeNode { n0: -1, n1: -1 };
                    decode[cur as usize].n0 = top;
                    top += 1;
                }
                cur = decode[cur as usize].n0;
            }
            j -= 1;
        }
        if code[i as usize] & 1 == 1 {
            decode[cur as usize].n1 = nbr + i;
        } else {
            decode[cur as usize].n0 = nbr + i;
        }
    }
    decode
}

/// Sequential reader over a Huffman stream: fetches a new block header once
/// the previous block's symbols are exhausted, returns `None` at the
/// terminating empty block.
struct HufInput<'a> {
    bs: BitReader<'a>,
    decode: Vec<DecodeNode>,
    nbr: i64,
}

impl<'a> HufInput<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { bs: BitReader::new(data), decode: Vec::new(), nbr: 0 }
    }

    fn get(&mut self) -> Option<u8> {
        if self.nbr == -1 {
            return None;
        }
        if self.nbr == 0 {
            self.bs.n_bit = 0;
            self.nbr = self.bs.get_bits(16);
            if self.nbr <= 0 {
                self.nbr = -1;
                return None;
            }
            let mut length = [0i64; 256];
            for len in length.iter_mut() {
                *len = self.bs.get_bits(4);
            }
            let code = generate_prefix(&length);
            self.decode = build_decode_table(&code, &length);
        }
        let mut i: i64 = 0;
        while i < 256 {
            i = if self.bs.get_bits(1) == 1 {
                self.decode[i as usize].n1
            } else {
                self.decode[i as usize].n0
            };
        }
        self.nbr -= 1;
        Some((i - 256) as u8)
    }
}

/// Packs `files` into an archive buffer, the same format `archive::pack`
/// produces. Panics if a name is empty or longer than 255 bytes, the same
/// way the original would silently misbehave on such input.
pub fn encode(files: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(b'\\');
    out.push(b'/');
    for (name, data) in files {
        let name_bytes = name.as_bytes();
        assert!(!name_bytes.is_empty() && name_bytes.len() <= 255);
        out.push(name_bytes.len() as u8);
        out.extend_from_slice(name_bytes);

        let mut writer = BitWriter::new(&mut out);
        for chunk in data.chunks(4096) {
            write_hbuffer(&mut writer, chunk);
        }
        writer.put_bits(0, 16);
        writer.close();
    }
    out
}

/// Unpacks every entry of an archive buffer. Panics on a malformed archive
/// (bad magic, truncated stream), exactly as the C original would crash or
/// loop on garbage input - this module is a faithful port, not a hardened
/// one. Use `archive::decompress_slice` for fallible, error-returning
/// extraction.
pub fn decode(archive: &[u8]) -> Vec<(String, Vec<u8>)> {
    assert!(archive.len() >= 2 && &archive[0..2] == b"\\/", "bad magic");
    let mut pos = 2usize;
    let mut files = Vec::new();
    loop {
        if pos >= archive.len() {
            break;
        }
        let name_len = archive[pos] as usize;
        pos += 1;
        if name_len == 0 {
            break;
        }
        let name = String::from_utf8_lossy(&archive[pos..pos + name_len]).into_owned();
        pos += name_len;

        let mut hin = HufInput::new(&archive[pos..]);
        let mut out = Vec::new();
        while let Some(b) = hin.get() {
            out.push(b);
        }
        pos += hin.bs.pos;
        files.push((name, out));
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_basic_text() {
        let files = vec![("greeting.txt".to_string(), b"hello, hello, hello!".to_vec())];
        let packed = encode(&files);
        let unpacked = decode(&packed);
        assert_eq!(unpacked, files);
    }

    #[test]
    fn round_trips_full_alphabet_and_empty_file() {
        let files = vec![
            ("all256.bin".to_string(), (0u8..=255).collect::<Vec<u8>>()),
            ("empty.txt".to_string(), Vec::new()),
        ];
        let packed = encode(&files);
        let unpacked = decode(&packed);
        assert_eq!(unpacked, files);
    }

    #[test]
    fn round_trips_multiple_blocks() {
        let data: Vec<u8> = (0..9000).map(|i| ((i * 7) % 251) as u8).collect();
        let files = vec![("big.bin".to_string(), data)];
        let packed = encode(&files);
        let unpacked = decode(&packed);
        assert_eq!(unpacked, files);
    }

    #[test]
    fn starts_with_magic() {
        let packed = encode(&[("f".to_string(), b"x".to_vec())]);
        assert_eq!(&packed[0..2], b"\\/");
    }
}
