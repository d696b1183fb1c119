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

//! # Multi-Kernel Polar Encoder
//!
//! Encodes K information bits into an N-bit codeword with a generalized polar
//! transform. The information bits are scattered into the non-frozen positions
//! of an N-length vector (frozen positions are zero), then m = log_bp(N) stages
//! of bp×bp kernel products are applied in place. Stage `s` groups positions
//! with a stride of `bp^s`, which reproduces the Kronecker power of the kernel
//! without ever building the N×N generator.
//!
//! Size and shape checks happen at construction; encoding only checks buffer
//! lengths. Encoding takes `&self`, so one encoder can serve many threads and
//! each call owns its scratch buffers.

use super::bits::Bit;
use super::frozen::{check_mask, info_bit_positions, FrozenBitObserver, FrozenBits};
use super::matrix::BitMatrix;
use crate::error::{PolarError, PolarResult};
use log::{debug, trace, warn};
use rayon::prelude::*;
use std::marker::PhantomData;

/// Codeword length at and above which the blocks of a stage are spread over
/// the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// A block encoder mapping K bits to N bits, frame by frame.
pub trait Encoder<B: Bit>: Send + Sync {
    fn k(&self) -> usize;
    fn n(&self) -> usize;
    fn n_frames(&self) -> usize;

    /// Encodes a single frame. `u_k` must hold K bits and `x_n` N bits;
    /// any other length is a [`PolarError::LengthMismatch`].
    fn encode_frame(&self, u_k: &[B], x_n: &mut [B], frame_id: usize) -> PolarResult<()>;

    /// Encodes a batch of `n_frames` frames laid out back to back.
    fn encode(&self, u_k: &[B], x_n: &mut [B]) -> PolarResult<()> {
        let (k, n, frames) = (self.k(), self.n(), self.n_frames());
        check_len("info bits", k * frames, u_k.len())?;
        check_len("codeword", n * frames, x_n.len())?;

        if frames == 1 {
            return self.encode_frame(u_k, x_n, 0);
        }
        u_k.par_chunks(k)
            .zip(x_n.par_chunks_mut(n))
            .enumerate()
            .try_for_each(|(frame_id, (u, x))| self.encode_frame(u, x, frame_id))
    }

    /// Allocating variant of [`Encoder::encode`].
    fn encode_to_vec(&self, u_k: &[B]) -> PolarResult<Vec<B>> {
        let mut x_n = vec![B::ZERO; self.n() * self.n_frames()];
        self.encode(u_k, &mut x_n)?;
        Ok(x_n)
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> PolarResult<()> {
    if expected != actual {
        return Err(PolarError::LengthMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Returns m such that `bp^m == n`, if it exists.
pub fn stage_count(n: usize, bp: usize) -> Option<usize> {
    if bp < 2 || n == 0 {
        return None;
    }
    let mut p = 1usize;
    let mut m = 0;
    while p < n {
        p = p.checked_mul(bp)?;
        m += 1;
    }
    (p == n).then_some(m)
}

/// Polar encoder for an arbitrary square GF(2) kernel.
#[derive(Debug, Clone)]
pub struct PolarMkEncoder<B: Bit = u8> {
    k: usize,
    n: usize,
    n_frames: usize,
    bp: usize, // kernel size
    m: usize,  // number of stages, bp^m == n
    frozen_bits: FrozenBits,
    kernel: BitMatrix,
    ke: Vec<u8>,
    ke_inv: Option<Vec<u8>>,
    info_bits_pos: Vec<usize>,
    parallel_threshold: usize,
    _bits: PhantomData<fn() -> B>,
}

impl<B: Bit> PolarMkEncoder<B> {
    /// Single-frame encoder.
    pub fn new(
        k: usize,
        n: usize,
        frozen_bits: FrozenBits,
        kernel: BitMatrix,
    ) -> PolarResult<Self> {
        Self::with_frames(k, n, frozen_bits, kernel, 1)
    }

    /// Encoder using the 2×2 Arikan kernel.
    pub fn arikan(k: usize, n: usize, frozen_bits: FrozenBits) -> PolarResult<Self> {
        Self::new(k, n, frozen_bits, BitMatrix::arikan())
    }

    pub fn with_frames(
        k: usize,
        n: usize,
        frozen_bits: FrozenBits,
        kernel: BitMatrix,
        n_frames: usize,
    ) -> PolarResult<Self> {
        let m = Self::validate(k, n, n_frames, &frozen_bits, &kernel).map_err(|e| {
            warn!("rejecting polar encoder parameters (K={}, N={}): {}", k, n, e);
            e
        })?;
        let bp = kernel.size();

        let mut encoder = Self {
            k,
            n,
            n_frames,
            bp,
            m,
            frozen_bits,
            ke: kernel.transpose_flat(),
            ke_inv: kernel.inverse().map(|inv| inv.transpose_flat()),
            kernel,
            info_bits_pos: Vec::with_capacity(k),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            _bits: PhantomData,
        };
        encoder.on_frozen_bits_changed()?;

        debug!(
            "polar encoder ready: K={}, N={}, bp={}, m={}, frames={}",
            k, n, bp, m, n_frames
        );
        Ok(encoder)
    }

    fn validate(
        k: usize,
        n: usize,
        n_frames: usize,
        frozen_bits: &FrozenBits,
        kernel: &BitMatrix,
    ) -> PolarResult<usize> {
        if k == 0 {
            return Err(PolarError::ZeroParameter { name: "K" });
        }
        if n == 0 {
            return Err(PolarError::ZeroParameter { name: "N" });
        }
        if n_frames == 0 {
            return Err(PolarError::ZeroParameter { name: "frame count" });
        }
        check_mask(&frozen_bits.read(), k, n)?;

        let bp = kernel.size();
        if bp < 2 {
            return Err(PolarError::KernelTooSmall { size: bp });
        }
        stage_count(n, bp).ok_or(PolarError::NotAPowerOfKernelSize { n, kernel_size: bp })
    }

    /// Blocks of a stage are processed in parallel once N reaches `threshold`.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn kernel_size(&self) -> usize {
        self.bp
    }

    pub fn stages(&self) -> usize {
        self.m
    }

    pub fn kernel(&self) -> &BitMatrix {
        &self.kernel
    }

    /// Transposed kernel, row-major, one byte per entry.
    pub fn flattened_kernel(&self) -> &[u8] {
        &self.ke
    }

    pub fn info_bits_pos(&self) -> &[usize] {
        &self.info_bits_pos
    }

    pub fn frozen_bits(&self) -> &FrozenBits {
        &self.frozen_bits
    }

    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// The N×N generator `kernel^{⊗m}`. Only meant for inspection and testing.
    pub fn generator_matrix(&self) -> BitMatrix {
        self.kernel.kronecker_power(self.m)
    }

    /// Scatters the K information bits into the non-frozen positions of `u_n`
    /// and zeroes the frozen ones.
    pub fn convert(&self, u_k: &[B], u_n: &mut [B]) -> PolarResult<()> {
        check_len("info bits", self.k, u_k.len())?;
        check_len("codeword", self.n, u_n.len())?;
        self.scatter(u_k, u_n);
        Ok(())
    }

    /// Applies the m kernel stages to `x_n` in place.
    pub fn light_encode(&self, x_n: &mut [B]) -> PolarResult<()> {
        check_len("codeword", self.n, x_n.len())?;
        self.transform(x_n);
        Ok(())
    }

    fn scatter(&self, u_k: &[B], u_n: &mut [B]) {
        u_n.fill(B::ZERO);
        for (&pos, &bit) in self.info_bits_pos.iter().zip(u_k) {
            u_n[pos] = bit;
        }
    }

    fn transform(&self, x_n: &mut [B]) {
        apply_stages(x_n, &self.ke, self.bp, self.m, self.parallel_threshold);
    }

    /// Encodes one frame whose K information bits occupy the front of `buf`.
    ///
    /// The information bits are copied out before the scatter, since the
    /// scatter overwrites the very positions they are read from.
    pub fn encode_in_place(&self, buf: &mut [B]) -> PolarResult<()> {
        check_len("codeword", self.n, buf.len())?;
        let u_k = buf[..self.k].to_vec();
        self.scatter(&u_k, buf);
        self.transform(buf);
        Ok(())
    }

    /// True if `x_n` is a codeword of this code: undoing the transform with the
    /// inverse kernel must leave every frozen position at zero.
    pub fn is_codeword(&self, x_n: &[B]) -> PolarResult<bool> {
        check_len("codeword", self.n, x_n.len())?;
        let ke_inv = self.ke_inv.as_deref().ok_or(PolarError::SingularKernel)?;

        let mut u_n = x_n.to_vec();
        apply_stages(&mut u_n, ke_inv, self.bp, self.m, self.parallel_threshold);

        let mut info = self.info_bits_pos.iter().peekable();
        for (i, bit) in u_n.iter().enumerate() {
            if info.peek() == Some(&&i) {
                info.next();
            } else if bit.is_one() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<B: Bit> Encoder<B> for PolarMkEncoder<B> {
    fn k(&self) -> usize {
        self.k
    }

    fn n(&self) -> usize {
        self.n
    }

    fn n_frames(&self) -> usize {
        self.n_frames
    }

    fn encode_frame(&self, u_k: &[B], x_n: &mut [B], frame_id: usize) -> PolarResult<()> {
        trace!("encoding frame {}", frame_id);
        self.convert(u_k, x_n)?;
        self.transform(x_n);
        Ok(())
    }
}

impl<B: Bit> FrozenBitObserver for PolarMkEncoder<B> {
    fn on_frozen_bits_changed(&mut self) -> PolarResult<()> {
        let mask = self.frozen_bits.read();
        check_mask(&mask, self.k, self.n).map_err(|e| {
            warn!("ignoring frozen bits update: {}", e);
            e
        })?;
        self.info_bits_pos = info_bit_positions(&mask);
        debug!("frozen bits updated: {} information positions", self.info_bits_pos.len());
        Ok(())
    }
}

// --- Staged transform ---

/// Per-call working memory for one kernel application.
struct Scratch<B> {
    idx: Vec<usize>,
    values: Vec<B>,
}

impl<B: Bit> Scratch<B> {
    fn new(bp: usize) -> Self {
        Self {
            idx: vec![0; bp],
            values: vec![B::ZERO; bp],
        }
    }
}

fn apply_stages<B: Bit>(x: &mut [B], ke: &[u8], bp: usize, m: usize, parallel_threshold: usize) {
    let n = x.len();
    let mut scratch = Scratch::new(bp);
    let mut block_size = 1;

    for _ in 0..m {
        let span = block_size * bp;
        if n >= parallel_threshold && n / span > 1 {
            x.par_chunks_mut(span).for_each_init(
                || Scratch::new(bp),
                |scratch, block| apply_block(block, ke, block_size, scratch),
            );
        } else {
            for block in x.chunks_mut(span) {
                apply_block(block, ke, block_size, &mut scratch);
            }
        }
        block_size = span;
    }
}

// One block of `block_size * bp` positions: `block_size` kernel applications,
// the k-th touching offsets k, k + block_size, ..., k + (bp - 1) * block_size.
#[inline]
fn apply_block<B: Bit>(block: &mut [B], ke: &[u8], block_size: usize, scratch: &mut Scratch<B>) {
    for k in 0..block_size {
        for (i, pos) in scratch.idx.iter_mut().enumerate() {
            *pos = block_size * i + k;
        }
        apply_kernel(block, &scratch.idx, ke, &mut scratch.values);
    }
}

// All outputs are computed from the operands before any of them is written back.
#[inline]
fn apply_kernel<B: Bit>(x: &mut [B], idx: &[usize], ke: &[u8], out: &mut [B]) {
    let size = idx.len();
    for (i, o) in out.iter_mut().enumerate() {
        let row = &ke[i * size..(i + 1) * size];
        let mut acc = B::ZERO;
        for (&pos, &coef) in idx.iter().zip(row) {
            acc = acc ^ (x[pos] & B::from_bool(coef != 0));
        }
        *o = acc.lsb();
    }
    for (&pos, &v) in idx.iter().zip(out.iter()) {
        x[pos] = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polar::bits::parse_mask;

    fn arikan4() -> PolarMkEncoder<u8> {
        let frozen = FrozenBits::new(parse_mask("1100").unwrap());
        PolarMkEncoder::arikan(2, 4, frozen).unwrap()
    }

    #[test]
    fn arikan_length_four_table() {
        let enc = arikan4();
        assert_eq!(enc.kernel_size(), 2);
        assert_eq!(enc.stages(), 2);
        assert_eq!(enc.encode_to_vec(&[1, 1]).unwrap(), vec![0, 1, 0, 1]);
        assert_eq!(enc.encode_to_vec(&[0, 1]).unwrap(), vec![1, 1, 1, 1]);
        assert_eq!(enc.encode_to_vec(&[1, 0]).unwrap(), vec![1, 0, 1, 0]);
        assert_eq!(enc.encode_to_vec(&[0, 0]).unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn convert_scatters_in_ascending_order() {
        let enc = PolarMkEncoder::<u8>::with_frames(
            3,
            9,
            FrozenBits::new(parse_mask("101001111").unwrap()),
            BitMatrix::parse("100,110,111").unwrap(),
            1,
        )
        .unwrap();
        let mut u_n = vec![7u8; 9];
        enc.convert(&[1, 0, 1], &mut u_n).unwrap();
        assert_eq!(u_n, vec![0, 1, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn single_frame_lengths_are_checked() {
        let enc = arikan4();
        let mut x_n = vec![0u8; 4];
        assert_eq!(
            enc.encode_frame(&[1], &mut x_n, 0),
            Err(PolarError::LengthMismatch {
                what: "info bits",
                expected: 2,
                actual: 1
            })
        );
        let mut short = vec![0u8; 3];
        assert_eq!(
            enc.encode_frame(&[1, 1], &mut short, 0),
            Err(PolarError::LengthMismatch {
                what: "codeword",
                expected: 4,
                actual: 3
            })
        );
        assert!(enc.convert(&[1, 1, 0], &mut x_n).is_err());
        assert!(enc.light_encode(&mut short).is_err());

        enc.encode_frame(&[1, 1], &mut x_n, 0).unwrap();
        assert_eq!(x_n, vec![0, 1, 0, 1]);
    }

    #[test]
    fn in_place_matches_out_of_place() {
        let enc = PolarMkEncoder::<u16>::arikan(
            4,
            8,
            FrozenBits::new(parse_mask("11101000").unwrap()),
        )
        .unwrap();
        let u_k = [1u16, 0, 1, 1];
        let expected = enc.encode_to_vec(&u_k).unwrap();
        let mut buf = vec![0u16; 8];
        buf[..4].copy_from_slice(&u_k);
        enc.encode_in_place(&mut buf).unwrap();
        assert_eq!(buf, expected);
        assert!(enc.encode_in_place(&mut buf[..7]).is_err());
    }

    #[test]
    fn single_position_code_has_no_stages() {
        let enc =
            PolarMkEncoder::<u8>::new(1, 1, FrozenBits::new(vec![false]), BitMatrix::parse("100,110,111").unwrap())
                .unwrap();
        assert_eq!(enc.stages(), 0);
        assert_eq!(enc.encode_to_vec(&[1]).unwrap(), vec![1]);
        assert_eq!(enc.encode_to_vec(&[0]).unwrap(), vec![0]);
    }

    #[test]
    fn kernel_with_write_hazard_matches_generator() {
        // Output slot 1 depends on operand 0, which slot 0 overwrites.
        let kernel = BitMatrix::parse("11,10").unwrap();
        let enc = PolarMkEncoder::<u8>::new(
            8,
            8,
            FrozenBits::new(vec![false; 8]),
            kernel,
        )
        .unwrap();
        let g = enc.generator_matrix();
        for v in 0u32..256 {
            let u: Vec<u8> = (0..8).map(|i| ((v >> i) & 1) as u8).collect();
            assert_eq!(enc.encode_to_vec(&u).unwrap(), g.mul_row_vector(&u).unwrap());
        }
    }

    #[test]
    fn construction_errors() {
        let kernel = BitMatrix::arikan();
        assert_eq!(
            PolarMkEncoder::<u8>::new(2, 4, FrozenBits::new(parse_mask("110").unwrap()), kernel.clone())
                .unwrap_err(),
            PolarError::LengthMismatch {
                what: "frozen bits",
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(
            PolarMkEncoder::<u8>::arikan(3, 8, FrozenBits::new(parse_mask("101001").unwrap()))
                .unwrap_err(),
            PolarError::LengthMismatch {
                what: "frozen bits",
                expected: 8,
                actual: 6
            }
        );
        assert_eq!(
            PolarMkEncoder::<u8>::new(2, 4, FrozenBits::new(parse_mask("1000").unwrap()), kernel.clone())
                .unwrap_err(),
            PolarError::InfoCountMismatch {
                expected: 2,
                actual: 3
            }
        );
        assert_eq!(
            PolarMkEncoder::<u8>::new(
                3,
                6,
                FrozenBits::new(parse_mask("111000").unwrap()),
                BitMatrix::parse("1000,1100,1010,1111").unwrap()
            )
            .unwrap_err(),
            PolarError::NotAPowerOfKernelSize { n: 6, kernel_size: 4 }
        );
        assert_eq!(
            PolarMkEncoder::<u8>::new(0, 4, FrozenBits::new(vec![true; 4]), kernel.clone()).unwrap_err(),
            PolarError::ZeroParameter { name: "K" }
        );
        assert_eq!(
            PolarMkEncoder::<u8>::new(1, 1, FrozenBits::new(vec![false]), BitMatrix::identity(1))
                .unwrap_err(),
            PolarError::KernelTooSmall { size: 1 }
        );
        assert_eq!(
            PolarMkEncoder::<u8>::with_frames(2, 4, FrozenBits::new(parse_mask("1100").unwrap()), kernel, 0)
                .unwrap_err(),
            PolarError::ZeroParameter { name: "frame count" }
        );
    }

    #[test]
    fn stage_count_exact_powers_only() {
        assert_eq!(stage_count(1, 2), Some(0));
        assert_eq!(stage_count(27, 3), Some(3));
        assert_eq!(stage_count(1024, 2), Some(10));
        assert_eq!(stage_count(12, 2), None);
        assert_eq!(stage_count(6, 4), None);
        assert_eq!(stage_count(usize::MAX, 2), None);
    }

    #[test]
    fn notifier_refreshes_positions() {
        let mut enc = arikan4();
        assert_eq!(enc.info_bits_pos(), &[2, 3]);
        enc.frozen_bits().swap(1, 2).unwrap();
        // not picked up until notified
        assert_eq!(enc.info_bits_pos(), &[2, 3]);
        enc.on_frozen_bits_changed().unwrap();
        assert_eq!(enc.info_bits_pos(), &[1, 3]);
        assert_eq!(enc.encode_to_vec(&[1, 0]).unwrap(), vec![1, 1, 0, 0]);

        // an update breaking the info count is rejected and the old positions kept
        enc.frozen_bits().set(0, false).unwrap();
        assert_eq!(
            enc.on_frozen_bits_changed(),
            Err(PolarError::InfoCountMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(enc.info_bits_pos(), &[1, 3]);
    }

    #[test]
    fn codeword_check() {
        let enc = arikan4();
        assert!(enc.is_codeword(&[0, 1, 0, 1]).unwrap());
        assert!(enc.is_codeword(&[1, 1, 1, 1]).unwrap());
        assert!(!enc.is_codeword(&[1, 0, 0, 0]).unwrap());
        assert!(enc.is_codeword(&[1, 1]).is_err());

        let singular = PolarMkEncoder::<u8>::new(
            2,
            4,
            FrozenBits::new(parse_mask("1100").unwrap()),
            BitMatrix::parse("11,11").unwrap(),
        )
        .unwrap();
        assert_eq!(singular.is_codeword(&[0, 0, 0, 0]), Err(PolarError::SingularKernel));
    }

    #[test]
    fn parallel_stages_match_serial() {
        let n = 81;
        let mask: Vec<bool> = (0..n).map(|i| i % 3 == 0).collect();
        let k = mask.iter().filter(|&&f| !f).count();
        let kernel = BitMatrix::parse("100,101,111").unwrap();
        let serial =
            PolarMkEncoder::<u32>::new(k, n, FrozenBits::new(mask.clone()), kernel.clone()).unwrap();
        let parallel = PolarMkEncoder::<u32>::new(k, n, FrozenBits::new(mask), kernel)
            .unwrap()
            .with_parallel_threshold(1);
        let u_k: Vec<u32> = (0..k).map(|i| ((i * 7 + 3) % 5 % 2) as u32).collect();
        assert_eq!(
            serial.encode_to_vec(&u_k).unwrap(),
            parallel.encode_to_vec(&u_k).unwrap()
        );
    }
}
