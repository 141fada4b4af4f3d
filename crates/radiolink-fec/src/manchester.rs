//! Manchester line coding.
//!
//! Every input bit becomes a transition: `0` is sent as `10` and `1` as `01`,
//! so the physical layer never sees more than two equal bits in a row. The
//! output is always exactly twice the size of the input.

use crate::error::{FecError, Result};

const ZERO_PAIR: u16 = 0b10;
const ONE_PAIR: u16 = 0b01;

/// Line-coded form of every byte value, MSB first.
static EXPAND: [u16; 256] = build_expand_table();

const fn build_expand_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut byte = 0;
    while byte < 256 {
        let mut word = 0u16;
        let mut bit = 8;
        while bit > 0 {
            bit -= 1;
            let pair = if (byte >> bit) & 1 == 1 {
                ONE_PAIR
            } else {
                ZERO_PAIR
            };
            word = (word << 2) | pair;
        }
        table[byte] = word;
        byte += 1;
    }
    table
}

/// Line noise seen by [`decode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineReport {
    /// Bit pairs that were neither `01` nor `10`.
    pub invalid_pairs: usize,
}

impl LineReport {
    pub fn is_clean(&self) -> bool {
        self.invalid_pairs == 0
    }
}

/// Expand `input` into `output`; `output` must be exactly `2 * input.len()`.
pub fn encode(input: &[u8], output: &mut [u8]) -> Result<()> {
    check_output(output.len(), input.len() * 2)?;
    for (byte, dst) in input.iter().zip(output.chunks_exact_mut(2)) {
        dst.copy_from_slice(&EXPAND[*byte as usize].to_be_bytes());
    }
    Ok(())
}

/// Collapse `input` back into `output`; `output` must be exactly half the size.
///
/// A `00` or `11` pair cannot come from the encoder. Both valid patterns are
/// one bit away from it, so the pair is read by its second bit, which is the
/// bit that agrees with the transition's end state.
pub fn decode(input: &[u8], output: &mut [u8]) -> Result<LineReport> {
    if input.len() % 2 != 0 {
        return Err(FecError::InputNotMultiple {
            len: input.len(),
            quantum: 2,
        });
    }
    check_output(output.len(), input.len() / 2)?;

    let mut report = LineReport::default();
    for (src, dst) in input.chunks_exact(2).zip(output.iter_mut()) {
        let word = u16::from_be_bytes([src[0], src[1]]);
        let mut byte = 0u8;
        for shift in (0..8).rev() {
            let pair = (word >> (shift * 2)) & 0b11;
            if pair != ZERO_PAIR && pair != ONE_PAIR {
                report.invalid_pairs += 1;
            }
            byte = (byte << 1) | (pair & 1) as u8;
        }
        *dst = byte;
    }
    Ok(report)
}

/// Allocating form of [`encode`].
pub fn encode_to_vec(input: &[u8]) -> Result<Vec<u8>> {
    let mut out = vec![0u8; input.len() * 2];
    encode(input, &mut out)?;
    Ok(out)
}

/// Allocating form of [`decode`].
pub fn decode_to_vec(input: &[u8]) -> Result<(Vec<u8>, LineReport)> {
    let mut out = vec![0u8; input.len() / 2];
    let report = decode(input, &mut out)?;
    Ok((out, report))
}

fn check_output(actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(FecError::OutputLength { expected, actual });
    }
    Ok(())
}
