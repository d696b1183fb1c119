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

//! # GF(2) Matrices
//!
//! Square binary matrices used as polar kernels, together with the Kronecker
//! composer that explains the staged encoder: the generator of a code of length
//! `bp^m` is the m-fold Kronecker power of the kernel, and applying it as m
//! passes of `N / bp` small kernel products gives the same codeword as one
//! N×N multiply. The full generator is only materialized for diagnostics and
//! for checking the staged transform.

use super::bits::{parse_bits, Bit};
use crate::error::{PolarError, PolarResult};
use std::fmt;

/// Square matrix over GF(2), stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    size: usize,
    data: Vec<bool>,
}

impl BitMatrix {
    /// Builds a matrix from rows, rejecting empty and non-square input.
    pub fn from_rows(rows: &[Vec<bool>]) -> PolarResult<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(PolarError::KernelTooSmall { size });
        }
        let mut data = Vec::with_capacity(size * size);
        for (row, r) in rows.iter().enumerate() {
            if r.len() != size {
                return Err(PolarError::NonSquareKernel {
                    row,
                    expected: size,
                    actual: r.len(),
                });
            }
            data.extend_from_slice(r);
        }
        Ok(Self { size, data })
    }

    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![false; size * size],
        }
    }

    pub fn identity(size: usize) -> Self {
        let mut m = Self::zeros(size);
        for i in 0..size {
            m.set(i, i, true);
        }
        m
    }

    /// The classical 2×2 kernel `[[1,0],[1,1]]`.
    pub fn arikan() -> Self {
        Self {
            size: 2,
            data: vec![true, false, true, true],
        }
    }

    /// Parses comma separated rows such as `"100,110,111"`.
    pub fn parse(s: &str) -> PolarResult<Self> {
        let rows = s
            .split(|c: char| c == ',' || c == ';')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| {
                parse_bits::<u8>(r, "kernel")
                    .map(|bits| bits.into_iter().map(|b| b == 1).collect::<Vec<bool>>())
            })
            .collect::<PolarResult<Vec<_>>>()?;
        Self::from_rows(&rows)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.data[row * self.size + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        self.data[row * self.size + col] = value;
    }

    pub fn row(&self, row: usize) -> &[bool] {
        &self.data[row * self.size..(row + 1) * self.size]
    }

    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        (0..self.size).map(|r| self.row(r).to_vec()).collect()
    }

    /// Flattens the transpose, one byte per entry: `out[i * size + j] = self[j][i]`.
    ///
    /// With this layout output slot `i` of a kernel application is the parity of
    /// `input[j] & out[i * size + j]` over `j`, read along a contiguous row.
    pub fn transpose_flat(&self) -> Vec<u8> {
        let n = self.size;
        let mut out = vec![0u8; n * n];
        for i in 0..n {
            for j in 0..n {
                out[i * n + j] = self.get(j, i) as u8;
            }
        }
        out
    }

    /// `self^{⊗m}`; the zeroth power is the 1×1 identity.
    pub fn kronecker_power(&self, m: usize) -> BitMatrix {
        let mut g = BitMatrix::identity(1);
        for _ in 0..m {
            g = kronecker_product(&g, self);
        }
        g
    }

    /// Row vector times matrix over GF(2): `x[c] = XOR_r u[r] & self[r][c]`.
    pub fn mul_row_vector<B: Bit>(&self, u: &[B]) -> PolarResult<Vec<B>> {
        if u.len() != self.size {
            return Err(PolarError::LengthMismatch {
                what: "row vector",
                expected: self.size,
                actual: u.len(),
            });
        }
        let mut x = vec![B::ZERO; self.size];
        for (r, &ur) in u.iter().enumerate() {
            if !ur.is_one() {
                continue;
            }
            for (c, xc) in x.iter_mut().enumerate() {
                *xc = *xc ^ B::from_bool(self.get(r, c));
            }
        }
        Ok(x)
    }

    /// Gauss-Jordan inversion over GF(2). Returns `None` for singular matrices.
    pub fn inverse(&self) -> Option<BitMatrix> {
        let n = self.size;
        let mut a = self.clone();
        let mut inv = BitMatrix::identity(n);

        for col in 0..n {
            let pivot = (col..n).find(|&r| a.get(r, col))?;
            if pivot != col {
                a.swap_rows(pivot, col);
                inv.swap_rows(pivot, col);
            }
            for r in 0..n {
                if r != col && a.get(r, col) {
                    a.xor_row_into(col, r);
                    inv.xor_row_into(col, r);
                }
            }
        }
        Some(inv)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        for c in 0..self.size {
            self.data.swap(a * self.size + c, b * self.size + c);
        }
    }

    // row[dst] ^= row[src]
    fn xor_row_into(&mut self, src: usize, dst: usize) {
        for c in 0..self.size {
            let v = self.get(src, c);
            if v {
                let idx = dst * self.size + c;
                self.data[idx] = !self.data[idx];
            }
        }
    }
}

/// Kronecker product of two square matrices:
/// `C[ra * b + rb][ca * b + cb] = A[ra][ca] & B[rb][cb]`.
pub fn kronecker_product(a: &BitMatrix, b: &BitMatrix) -> BitMatrix {
    let bs = b.size();
    let mut c = BitMatrix::zeros(a.size() * bs);
    for ra in 0..a.size() {
        for ca in 0..a.size() {
            if !a.get(ra, ca) {
                continue;
            }
            for rb in 0..bs {
                for cb in 0..bs {
                    c.set(ra * bs + rb, ca * bs + cb, b.get(rb, cb));
                }
            }
        }
    }
    c
}

impl fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.size {
            let line: String = self
                .row(r)
                .iter()
                .map(|&b| if b { '1' } else { '0' })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: &[&str]) -> BitMatrix {
        BitMatrix::parse(&rows.join(",")).unwrap()
    }

    #[test]
    fn rejects_non_square_rows() {
        let rows = vec![vec![true, false, true], vec![true, true, false]];
        assert_eq!(
            BitMatrix::from_rows(&rows),
            Err(PolarError::NonSquareKernel {
                row: 0,
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(
            BitMatrix::from_rows(&[]),
            Err(PolarError::KernelTooSmall { size: 0 })
        );
    }

    #[test]
    fn transpose_flat_orientation() {
        let k = m(&["100", "110", "111"]);
        let ke = k.transpose_flat();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(ke[i * 3 + j] == 1, k.get(j, i));
            }
        }
        assert_eq!(ke, vec![1, 1, 1, 0, 1, 1, 0, 0, 1]);
    }

    #[test]
    fn kronecker_of_arikan_kernels() {
        let f = BitMatrix::arikan();
        let g = kronecker_product(&f, &f);
        assert_eq!(g, m(&["1000", "1100", "1010", "1111"]));
        assert_eq!(f.kronecker_power(2), g);
        assert_eq!(f.kronecker_power(0), BitMatrix::identity(1));
    }

    #[test]
    fn kronecker_mixed_sizes() {
        let a = m(&["01", "10"]);
        let b = m(&["100", "110", "111"]);
        let c = kronecker_product(&a, &b);
        assert_eq!(c.size(), 6);
        for r in 0..6 {
            for col in 0..6 {
                let expected = a.get(r / 3, col / 3) && b.get(r % 3, col % 3);
                assert_eq!(c.get(r, col), expected);
            }
        }
    }

    #[test]
    fn row_vector_multiply() {
        let g = BitMatrix::arikan().kronecker_power(2);
        assert_eq!(g.mul_row_vector(&[0u8, 0, 1, 1]).unwrap(), vec![0, 1, 0, 1]);
        assert_eq!(g.mul_row_vector(&[0u8, 0, 0, 1]).unwrap(), vec![1, 1, 1, 1]);
        assert!(g.mul_row_vector(&[1u8, 0]).is_err());
    }

    #[test]
    fn inverse_round_trips() {
        let k = m(&["100", "101", "111"]);
        let inv = k.inverse().unwrap();
        let n = k.size();
        for r in 0..n {
            for c in 0..n {
                let mut acc = false;
                for t in 0..n {
                    acc ^= k.get(r, t) && inv.get(t, c);
                }
                assert_eq!(acc, r == c);
            }
        }
        assert!(m(&["11", "11"]).inverse().is_none());
        // the Arikan kernel is its own inverse over GF(2)
        assert_eq!(BitMatrix::arikan().inverse().unwrap(), BitMatrix::arikan());
    }

    #[test]
    fn display_prints_rows() {
        assert_eq!(BitMatrix::arikan().to_string(), "10\n11\n");
    }
}
