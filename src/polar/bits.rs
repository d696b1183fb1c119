// Copyright (c) 2024, The QuicFuscate Project Authors.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are
// met:
//
//     * Redistributions of source code must retain the above copyright
//       notice, this list of conditions and the following disclaimer.
//
//     * Redistributions in binary form must reproduce the above
//       copyright notice, this list of conditions and the following disclaimer
//       in the documentation and/or other materials provided with the
//       distribution.
//
//     * Neither the name of the copyright holder nor the names of its
//       contributors may be used to endorse or promote products derived from
//       this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT
// OWNER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT
// LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE,
// DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY
// THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! # Bit Storage
//!
//! Polar codewords are stored one bit per machine word. The encoder is generic
//! over the storage width so it can sit in pipelines that carry 8, 16, 32 or
//! 64-bit integers per bit. All arithmetic goes through explicit AND/XOR on the
//! least significant bit, so wider types never see carries or sign effects.

use crate::error::{PolarError, PolarResult};
use std::fmt::Debug;
use std::ops::{BitAnd, BitXor};

/// Integer type used to hold a single GF(2) value.
pub trait Bit:
    Copy
    + Default
    + Eq
    + Debug
    + Send
    + Sync
    + BitAnd<Output = Self>
    + BitXor<Output = Self>
    + 'static
{
    const ZERO: Self;
    const ONE: Self;

    #[inline(always)]
    fn from_bool(b: bool) -> Self {
        if b {
            Self::ONE
        } else {
            Self::ZERO
        }
    }

    /// Reduces the value to its GF(2) residue (the least significant bit).
    #[inline(always)]
    fn lsb(self) -> Self {
        self & Self::ONE
    }

    #[inline(always)]
    fn is_one(self) -> bool {
        self.lsb() == Self::ONE
    }
}

macro_rules! impl_bit {
    ($($t:ty),*) => {
        $(
            impl Bit for $t {
                const ZERO: Self = 0;
                const ONE: Self = 1;
            }
        )*
    };
}

impl_bit!(u8, u16, u32, u64);

/// Parses a string of '0'/'1' characters. Whitespace and '_' separators are skipped.
pub fn parse_bits<B: Bit>(s: &str, what: &'static str) -> PolarResult<Vec<B>> {
    let mut out = Vec::with_capacity(s.len());
    for (index, c) in s.chars().enumerate() {
        match c {
            '0' => out.push(B::ZERO),
            '1' => out.push(B::ONE),
            '_' => {}
            c if c.is_whitespace() => {}
            value => return Err(PolarError::InvalidBit { what, index, value }),
        }
    }
    Ok(out)
}

/// Parses a frozen-bit mask written as '0'/'1' characters, '1' meaning frozen.
pub fn parse_mask(s: &str) -> PolarResult<Vec<bool>> {
    Ok(parse_bits::<u8>(s, "frozen bits")?
        .into_iter()
        .map(|b| b == 1)
        .collect())
}

/// Renders bits as a compact '0'/'1' string.
pub fn format_bits<B: Bit>(bits: &[B]) -> String {
    bits.iter()
        .map(|b| if b.is_one() { '1' } else { '0' })
        .collect()
}

pub fn format_mask(mask: &[bool]) -> String {
    mask.iter().map(|&f| if f { '1' } else { '0' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_separators() {
        let bits: Vec<u8> = parse_bits("10_11 01", "info bits").unwrap();
        assert_eq!(bits, vec![1, 0, 1, 1, 0, 1]);
    }

    #[test]
    fn parse_rejects_non_bits() {
        let err = parse_bits::<u16>("1021", "info bits").unwrap_err();
        assert_eq!(
            err,
            PolarError::InvalidBit {
                what: "info bits",
                index: 2,
                value: '2'
            }
        );
    }

    #[test]
    fn lsb_ignores_upper_bits() {
        assert!(0b1011u32.is_one());
        assert!(!0b1010u64.is_one());
        assert_eq!(0xFEu8.lsb(), 0);
        assert_eq!(format_bits(&[3u8, 2, 1]), "101");
    }

    #[test]
    fn mask_round_trips_through_text() {
        let mask = parse_mask("1100").unwrap();
        assert_eq!(mask, vec![true, true, false, false]);
        assert_eq!(format_mask(&mask), "1100");
    }
}
