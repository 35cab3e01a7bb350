//! Per-block canonical Huffman code construction and the matching decode
//! tree, over the fixed 256-symbol byte alphabet.
//!
//! Ported from `generateLength`/`generatePrefix`/`buildDecodeTable` in
//! `examples/original_source/comp.c`, using `tools::heap::IndexedPriorityQueue`
//! for both the length-merge and the canonical-order enumeration, exactly as
//! the reference does. Private: `archive` is the only consumer.

use crate::tools::bitio::BitSource;
use crate::tools::heap::IndexedPriorityQueue;
use crate::Error;
use std::io::Read;

const ALPHABET: usize = 256;

/// Computes an optimal code length per symbol from a frequency table, by
/// repeatedly merging the two lowest-priority (here: lowest-frequency) nodes
/// and then sweeping the merge order backwards into depths.
///
/// Every one of the 256 symbols is seeded into the merge regardless of
/// frequency, so the shape of the tree - and therefore the lengths assigned
/// to the symbols that do appear - never depends on how many symbols are
/// absent from the block. A symbol with zero frequency still comes out of
/// this with whatever leaf depth the merge happens to give it; it is simply
/// never reached while encoding or decoding, since it never occurs in the
/// data. (`direct_ports::comp` makes the same choice, which is what lets the
/// `interop` test in `archive` hold byte for byte.)
pub(crate) fn build_lengths(freq: &[u32; ALPHABET]) -> [u8; ALPHABET] {
    let mut parent = vec![0i64; 2 * ALPHABET];
    let mut prio = IndexedPriorityQueue::create(2 * ALPHABET);
    for (sym, &f) in freq.iter().enumerate() {
        prio.push(sym, -(f as i64));
    }

    let mut i = ALPHABET;
    while prio.len() > 1 {
        let c1 = prio.pop();
        let mut f = prio.last_priority();
        parent[c1] = i as i64;
        let c2 = prio.pop();
        f += prio.last_priority();
        parent[c2] = i as i64;
        // f - 1 keeps composite nodes slightly lower priority than real
        // symbols of the same combined frequency, spreading length evenly
        // among ties instead of always favoring the earlier-merged side.
        prio.push(i, f - 1);
        i += 1;
    }
    i -= 1;
    let root = i;
    parent[root] = 0;
    let mut j = root;
    while j > 0 {
        j -= 1;
        parent[j] = parent[parent[j] as usize] + 1;
    }

    let mut length = [0u8; ALPHABET];
    for (sym, len) in length.iter_mut().enumerate() {
        *len = parent[sym] as u8;
    }
    length
}

/// Assigns canonical codewords for the given lengths. Symbols are enumerated
/// from the heap in descending `(length, symbol)` order - the longest,
/// highest-indexed codeword is assigned first and given the all-zero code,
/// with each subsequent (shorter-or-equal) code built from the previous one.
/// This follows `generatePrefix`'s actual extraction order; despite spec
/// prose describing a short-codes-first assignment, the order realized by
/// the reference implementation is descending, and canonical-code validity
/// does not depend on which end you start from. The `length > 0` guard
/// mirrors the reference's own defensive check; every symbol's length is
/// positive in practice (see `build_lengths`), so it never actually trims
/// anything for this alphabet.
pub(crate) fn canonical_codes(length: &[u8; ALPHABET]) -> [u32; ALPHABET] {
    let mut prio = IndexedPriorityQueue::create(ALPHABET);
    for (sym, &len) in length.iter().enumerate() {
        if len > 0 {
            prio.push(sym, len as i64 * ALPHABET as i64 + sym as i64);
        }
    }

    let mut table = [0u32; ALPHABET];
    if prio.is_empty() {
        return table;
    }
    let mut sym = prio.pop();
    let mut cur_len = length[sym] as i64;
    table[sym] = 0;
    let mut code: i64 = 0;
    while !prio.is_empty() {
        sym = prio.pop();
        code = (code >> (cur_len - length[sym] as i64)) + 1;
        cur_len = length[sym] as i64;
        table[sym] = code as u32;
    }
    table
}

/// One node of the decode tree: `n0`/`n1` hold the child reached by a 0 or 1
/// bit. A value `< ALPHABET` names another node in this vector; a value
/// `>= ALPHABET` is a leaf and names symbol `value - ALPHABET`. `-1` means
/// "not yet linked".
#[derive(Clone, Copy)]
pub(crate) struct DecodeNode {
    pub n0: i32,
    pub n1: i32,
}

/// Builds the decode tree described by `code`/`length`. Symbols with a
/// nonzero length are linked in; as with `canonical_codes`, that guard never
/// actually trims anything here, since `build_lengths` gives every one of
/// the 256 symbols a real leaf depth.
pub(crate) fn build_decode_tree(code: &[u32; ALPHABET], length: &[u8; ALPHABET]) -> Vec<DecodeNode> {
    let mut decode = vec![DecodeNode { n0: -1, n1: -1 }];
    let mut top: usize = 1;
    for sym in 0..ALPHABET {
        let len = length[sym];
        if len == 0 {
            continue;
        }
        let mut cur: usize = 0;
        for j in (1..len).rev() {
            let bit = (code[sym] >> j) & 1;
            if bit == 1 {
                if decode[cur].n1 < 0 {
                    decode.push(DecodeNode { n0: -1, n1: -1 });
                    decode[cur].n1 = top as i32;
                    top += 1;
                }
                cur = decode[cur].n1 as usize;
            } else {
                if decode[cur].n0 < 0 {
                    decode.push(DecodeNode { n0: -1, n1: -1 });
                    decode[cur].n0 = top as i32;
                    top += 1;
                }
                cur = decode[cur].n0 as usize;
            }
        }
        if code[sym] & 1 == 1 {
            decode[cur].n1 = (ALPHABET + sym) as i32;
        } else {
            decode[cur].n0 = (ALPHABET + sym) as i32;
        }
    }
    decode
}

/// Walks `tree` from the root, consuming one bit at a time from `source`,
/// until a leaf is reached, and returns its symbol.
pub(crate) fn decode_symbol<R: Read>(
    tree: &[DecodeNode],
    source: &mut BitSource<R>,
) -> Result<u8, Error> {
    let mut node: i32 = 0;
    while (node as usize) < ALPHABET {
        let bit = source.read(1)?;
        let n = &tree[node as usize];
        node = if bit == 1 { n.n1 } else { n.n0 };
    }
    Ok((node as usize - ALPHABET) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::bitio::BitSink;
    use std::io::Cursor;

    fn freq_of(data: &[u8]) -> [u32; ALPHABET] {
        let mut freq = [0u32; ALPHABET];
        for &b in data {
            freq[b as usize] += 1;
        }
        freq
    }

    #[test]
    fn every_symbol_gets_a_positive_length() {
        // Every one of the 256 leaves, including symbols absent from the
        // block, is seeded into the merge, so every symbol comes out with a
        // real depth - none is ever left at length 0.
        let freq = freq_of(b"aaaabbbc");
        let length = build_lengths(&freq);
        for len in length.iter() {
            assert!(*len > 0);
        }
    }

    #[test]
    fn single_symbol_block_still_round_trips() {
        let data = [42u8; 10];
        let freq = freq_of(&data);
        let length = build_lengths(&freq);
        let codes = canonical_codes(&length);
        let tree = build_decode_tree(&codes, &length);

        let mut buf = Vec::new();
        {
            let mut sink = BitSink::new(&mut buf);
            for &b in &data {
                sink.write(codes[b as usize], length[b as usize]).unwrap();
            }
            sink.flush().unwrap();
        }
        let mut source = BitSource::new(Cursor::new(buf));
        for &expected in &data {
            assert_eq!(decode_symbol(&tree, &mut source).unwrap(), expected);
        }
    }

    #[test]
    fn codes_round_trip_through_decode_tree() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let freq = freq_of(data);
        let length = build_lengths(&freq);
        let codes = canonical_codes(&length);
        let tree = build_decode_tree(&codes, &length);

        let mut buf = Vec::new();
        {
            let mut sink = BitSink::new(&mut buf);
            for &b in data {
                sink.write(codes[b as usize], length[b as usize]).unwrap();
            }
            sink.flush().unwrap();
        }

        let mut source = BitSource::new(Cursor::new(buf));
        let mut out = Vec::new();
        for _ in 0..data.len() {
            out.push(decode_symbol(&tree, &mut source).unwrap());
        }
        assert_eq!(out, data);
    }

    #[test]
    fn code_lengths_are_deterministic_across_runs() {
        let freq = freq_of(b"mississippi river");
        let a = build_lengths(&freq);
        let b = build_lengths(&freq);
        assert_eq!(a, b);
        assert_eq!(canonical_codes(&a), canonical_codes(&b));
    }
}
