use std::sync::OnceLock;

use tracing::trace;

use crate::error::{FecError, Result};

/// Bytes consumed per encode step: two 12-bit symbols.
pub const INPUT_QUANTUM: usize = 3;

/// Bytes produced per encode step: two 24-bit codewords.
pub const ENCODED_QUANTUM: usize = 6;

/// Number of bit errors a single codeword always corrects.
pub const CORRECTABLE_BITS: u32 = 3;

/// Generator polynomial of the (23,12) cyclic Golay code:
/// x^11 + x^9 + x^7 + x^6 + x^5 + x + 1.
const GENERATOR: u32 = 0xAE3;

const SYMBOL_MASK: u32 = 0xFFF;
const WORD_BITS: u32 = 24;
const SYNDROMES: usize = 1 << 12;

/// Per-call correction summary returned by [`decode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Codewords processed.
    pub codewords: usize,
    /// Bits flipped back by the decoder across all codewords.
    pub corrected_bits: usize,
    /// Codewords that landed in a weight-4 coset. A symbol is still written
    /// for them, but it is a guess between equally distant codewords.
    pub uncorrectable: usize,
}

impl DecodeReport {
    /// True when every codeword decoded without ambiguity.
    pub fn is_clean(&self) -> bool {
        self.uncorrectable == 0
    }

    /// Accumulate another report into this one.
    pub fn merge(&mut self, other: DecodeReport) {
        self.codewords += other.codewords;
        self.corrected_bits += other.corrected_bits;
        self.uncorrectable += other.uncorrectable;
    }
}

struct CodeTables {
    /// Codeword for every 12-bit symbol.
    codewords: [u32; SYNDROMES],
    /// Minimum-weight error pattern for every 12-bit syndrome.
    leaders: [u32; SYNDROMES],
}

fn tables() -> &'static CodeTables {
    static TABLES: OnceLock<CodeTables> = OnceLock::new();
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> CodeTables {
    let mut codewords = [0u32; SYNDROMES];
    for (symbol, slot) in codewords.iter_mut().enumerate() {
        *slot = systematic_codeword(symbol as u32);
    }

    let syndrome_of = |word: u32| -> usize {
        let symbol = (word >> 12) & SYMBOL_MASK;
        ((codewords[symbol as usize] ^ word) & SYMBOL_MASK) as usize
    };

    // Fill by increasing weight so each coset keeps its lightest member.
    // Weights 0..=3 never collide (minimum distance is 8); weight 4 fills
    // the remaining 1771 cosets, which is the covering radius of the code.
    let mut leaders = [u32::MAX; SYNDROMES];
    leaders[0] = 0;
    let mut filled = 1usize;
    for weight in 1..=4u32 {
        for_each_pattern(weight, &mut |pattern| {
            let s = syndrome_of(pattern);
            if leaders[s] == u32::MAX {
                leaders[s] = pattern;
                filled += 1;
            }
        });
    }
    debug_assert_eq!(filled, SYNDROMES);

    trace!(filled, "golay tables initialized");
    CodeTables { codewords, leaders }
}

fn for_each_pattern(weight: u32, f: &mut impl FnMut(u32)) {
    fn recurse(start: u32, left: u32, acc: u32, f: &mut impl FnMut(u32)) {
        if left == 0 {
            f(acc);
            return;
        }
        for bit in start..=(WORD_BITS - left) {
            recurse(bit + 1, left - 1, acc | (1 << bit), f);
        }
    }
    recurse(0, weight, 0, f);
}

/// `[symbol (12) | cyclic parity (11) | overall parity (1)]`.
fn systematic_codeword(symbol: u32) -> u32 {
    let symbol = symbol & SYMBOL_MASK;
    let mut remainder = symbol << 11;
    for i in (0..12).rev() {
        if remainder & (1 << (i + 11)) != 0 {
            remainder ^= GENERATOR << i;
        }
    }
    let parity = remainder & 0x7FF;
    let inner = (symbol << 11) | parity;
    (inner << 1) | (inner.count_ones() & 1)
}

/// Encode one 12-bit symbol into its 24-bit codeword.
///
/// Bits above the low 12 of `symbol` are ignored.
pub fn encode_symbol(symbol: u16) -> u32 {
    tables().codewords[(symbol as u32 & SYMBOL_MASK) as usize]
}

/// 12-bit syndrome of a received 24-bit word. Zero for valid codewords.
pub fn syndrome(word: u32) -> u16 {
    let word = word & 0xFF_FFFF;
    let symbol = (word >> 12) & SYMBOL_MASK;
    ((tables().codewords[symbol as usize] ^ word) & SYMBOL_MASK) as u16
}

/// Decode one 24-bit word to the symbol of its nearest codeword.
///
/// Returns the symbol and the weight of the error pattern that was removed.
/// A weight of 4 means the word sat equally far from several codewords and
/// the symbol is a best-effort guess.
pub fn decode_word(word: u32) -> (u16, u32) {
    let word = word & 0xFF_FFFF;
    let error = tables().leaders[syndrome(word) as usize];
    let corrected = word ^ error;
    (((corrected >> 12) & SYMBOL_MASK) as u16, error.count_ones())
}

/// Output size of [`encode`] for `input_len` bytes.
pub fn encoded_len(input_len: usize) -> usize {
    input_len * 2
}

/// Output size of [`decode`] for `encoded_len` bytes.
pub fn decoded_len(encoded_len: usize) -> usize {
    encoded_len / 2
}

/// Encode `input` into `output`.
///
/// `input.len()` must be a multiple of [`INPUT_QUANTUM`] and `output` must be
/// exactly twice as long. Each 3-byte triad is split into two 12-bit symbols
/// and written as two big-endian 24-bit codewords.
pub fn encode(input: &[u8], output: &mut [u8]) -> Result<()> {
    check_lengths(input.len(), INPUT_QUANTUM, output.len(), encoded_len(input.len()))?;

    let codewords = &tables().codewords;
    for (src, dst) in input
        .chunks_exact(INPUT_QUANTUM)
        .zip(output.chunks_exact_mut(ENCODED_QUANTUM))
    {
        let (hi, lo) = split_triad(src);
        write_word(&mut dst[..3], codewords[hi as usize]);
        write_word(&mut dst[3..], codewords[lo as usize]);
    }
    Ok(())
}

/// Decode `input` into `output`, correcting up to 3 bit errors per codeword.
///
/// `input.len()` must be a multiple of [`ENCODED_QUANTUM`] and `output` must be
/// exactly half as long. Heavier corruption is never reported as an error;
/// it shows up in [`DecodeReport::uncorrectable`] or, past the detection
/// limit, as silently wrong data.
pub fn decode(input: &[u8], output: &mut [u8]) -> Result<DecodeReport> {
    check_lengths(input.len(), ENCODED_QUANTUM, output.len(), decoded_len(input.len()))?;

    let mut report = DecodeReport::default();
    for (src, dst) in input
        .chunks_exact(ENCODED_QUANTUM)
        .zip(output.chunks_exact_mut(INPUT_QUANTUM))
    {
        let (hi, hi_errors) = decode_word(read_word(&src[..3]));
        let (lo, lo_errors) = decode_word(read_word(&src[3..]));
        for errors in [hi_errors, lo_errors] {
            report.codewords += 1;
            if errors > CORRECTABLE_BITS {
                report.uncorrectable += 1;
            } else {
                report.corrected_bits += errors as usize;
            }
        }
        join_triad(hi, lo, dst);
    }
    Ok(report)
}

/// Allocating form of [`encode`].
pub fn encode_to_vec(input: &[u8]) -> Result<Vec<u8>> {
    let mut out = vec![0u8; encoded_len(input.len())];
    encode(input, &mut out)?;
    Ok(out)
}

/// Allocating form of [`decode`].
pub fn decode_to_vec(input: &[u8]) -> Result<(Vec<u8>, DecodeReport)> {
    let mut out = vec![0u8; decoded_len(input.len())];
    let report = decode(input, &mut out)?;
    Ok((out, report))
}

fn check_lengths(input: usize, quantum: usize, output: usize, expected: usize) -> Result<()> {
    if input % quantum != 0 {
        return Err(FecError::InputNotMultiple {
            len: input,
            quantum,
        });
    }
    if output != expected {
        return Err(FecError::OutputLength {
            expected,
            actual: output,
        });
    }
    Ok(())
}

fn split_triad(src: &[u8]) -> (u16, u16) {
    let hi = (u16::from(src[0]) << 4) | (u16::from(src[1]) >> 4);
    let lo = (u16::from(src[1] & 0x0F) << 8) | u16::from(src[2]);
    (hi, lo)
}

fn join_triad(hi: u16, lo: u16, dst: &mut [u8]) {
    dst[0] = (hi >> 4) as u8;
    dst[1] = (((hi & 0x0F) << 4) | (lo >> 8)) as u8;
    dst[2] = lo as u8;
}

fn write_word(dst: &mut [u8], word: u32) {
    dst.copy_from_slice(&word.to_be_bytes()[1..]);
}

fn read_word(src: &[u8]) -> u32 {
    u32::from_be_bytes([0, src[0], src[1], src[2]])
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::bits::{flip_bit, hamming_distance};

    fn alphabet(len: usize) -> Vec<u8> {
        (0..len).map(|i| b'a' + (i % 26) as u8).collect()
    }

    #[test]
    fn codewords_are_valid_and_distinct() {
        let mut seen = std::collections::HashSet::new();
        for symbol in 0u16..4096 {
            let cw = encode_symbol(symbol);
            assert!(cw < (1 << 24));
            assert_eq!(syndrome(cw), 0, "symbol {symbol:#05x}");
            assert_eq!(cw.count_ones() % 2, 0, "extended code has even weight");
            assert!(seen.insert(cw));
        }
    }

    #[test]
    fn minimum_distance_is_eight() {
        let min = (1u16..4096)
            .map(|s| encode_symbol(s).count_ones())
            .min()
            .unwrap();
        assert_eq!(min, 8);
    }

    #[test]
    fn symbol_is_carried_in_high_bits() {
        assert_eq!(encode_symbol(0), 0);
        assert_eq!(encode_symbol(0xABC) >> 12, 0xABC);
        assert_eq!(encode_symbol(0xFABC), encode_symbol(0x0ABC));
    }

    #[test]
    fn corrects_every_single_and_double_error() {
        for symbol in [0x000u16, 0x5A5, 0xFFF, 0x123] {
            let cw = encode_symbol(symbol);
            for a in 0..24 {
                assert_eq!(decode_word(cw ^ (1 << a)), (symbol, 1));
                for b in (a + 1)..24 {
                    assert_eq!(decode_word(cw ^ (1 << a) ^ (1 << b)), (symbol, 2));
                }
            }
        }
    }

    #[test]
    fn corrects_every_triple_error() {
        let symbol = 0xC3Du16;
        let cw = encode_symbol(symbol);
        for a in 0..24 {
            for b in (a + 1)..24 {
                for c in (b + 1)..24 {
                    let received = cw ^ (1 << a) ^ (1 << b) ^ (1 << c);
                    assert_eq!(decode_word(received), (symbol, 3), "bits {a},{b},{c}");
                }
            }
        }
    }

    #[test]
    fn four_errors_are_flagged() {
        let cw = encode_symbol(0x777);
        let (_, weight) = decode_word(cw ^ 0b1000_0100_0010_0001);
        assert_eq!(weight, 4);
    }

    #[test]
    fn encode_layout_is_two_words_per_triad() {
        let out = encode_to_vec(&[0xAB, 0xCD, 0xEF]).unwrap();
        let hi = encode_symbol(0xABC);
        let lo = encode_symbol(0xDEF);
        assert_eq!(&out[..3], &hi.to_be_bytes()[1..]);
        assert_eq!(&out[3..], &lo.to_be_bytes()[1..]);
    }

    #[test]
    fn roundtrip_without_errors() {
        let data: Vec<u8> = (0..=255u8).chain(0..=254u8).collect();
        assert_eq!(data.len() % 3, 0);
        let encoded = encode_to_vec(&data).unwrap();
        assert_eq!(encoded.len(), data.len() * 2);

        let (decoded, report) = decode_to_vec(&encoded).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(report.codewords, data.len() / 3 * 2);
        assert_eq!(report.corrected_bits, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn empty_input_is_a_noop() {
        let mut out = [];
        encode(&[], &mut out).unwrap();
        let report = decode(&[], &mut out).unwrap();
        assert_eq!(report, DecodeReport::default());
    }

    #[test]
    fn rejects_non_multiple_of_three() {
        let mut out = [0u8; 8];
        let err = encode(&[1, 2, 3, 4], &mut out).unwrap_err();
        assert_eq!(err, FecError::InputNotMultiple { len: 4, quantum: 3 });
    }

    #[test]
    fn rejects_non_multiple_of_six() {
        let mut out = [0u8; 4];
        let err = decode(&[0u8; 9], &mut out).unwrap_err();
        assert_eq!(err, FecError::InputNotMultiple { len: 9, quantum: 6 });
    }

    #[test]
    fn rejects_wrong_output_size() {
        let mut out = [0u8; 5];
        let err = encode(&[1, 2, 3], &mut out).unwrap_err();
        assert_eq!(
            err,
            FecError::OutputLength {
                expected: 6,
                actual: 5
            }
        );

        let mut out = [0u8; 4];
        assert!(matches!(
            decode(&[0u8; 6], &mut out),
            Err(FecError::OutputLength { expected: 3, .. })
        ));
    }

    #[test]
    fn alphabet_survives_35_sparse_errors() {
        let data = alphabet(96);
        let mut encoded = encode_to_vec(&data).unwrap();
        assert_eq!(encoded.len(), 192);

        // Random positions, capped at three per codeword.
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut per_word = [0u8; 64];
        let mut injected = 0;
        while injected < 35 {
            let pos = rng.gen_range(0..encoded.len() * 8);
            let word = pos / 24;
            if per_word[word] == 3 {
                continue;
            }
            per_word[word] += 1;
            flip_bit(&mut encoded, pos);
            injected += 1;
        }

        let (decoded, report) = decode_to_vec(&encoded).unwrap();
        assert_eq!(hamming_distance(&data, &decoded), 0);
        assert!(report.corrected_bits <= 35);
        assert!(report.is_clean());
    }

    #[test]
    fn error_correction_is_local_to_each_codeword() {
        let data = alphabet(6);
        let mut encoded = encode_to_vec(&data).unwrap();
        // Wreck the first codeword, leave the other three alone.
        for pos in [0, 2, 4, 6, 8, 10, 12] {
            flip_bit(&mut encoded, pos);
        }
        let (decoded, _) = decode_to_vec(&encoded).unwrap();
        assert_eq!(&decoded[2..], &data[2..]);
        assert_eq!(decoded[1] & 0x0F, data[1] & 0x0F);
    }

    #[test]
    fn report_merge_accumulates() {
        let mut total = DecodeReport {
            codewords: 2,
            corrected_bits: 1,
            uncorrectable: 0,
        };
        total.merge(DecodeReport {
            codewords: 4,
            corrected_bits: 3,
            uncorrectable: 1,
        });
        assert_eq!(total.codewords, 6);
        assert_eq!(total.corrected_bits, 4);
        assert!(!total.is_clean());
    }
}
