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

//! # Generalized Polar Encoding
//!
//! Multi-kernel polar codes over GF(2): codes of length `N = bp^m` built from
//! an arbitrary invertible bp×bp kernel, with the classical 2×2 Arikan kernel
//! as the default. The module is split into bit storage, matrix utilities,
//! frozen-bit bookkeeping, the staged encoder itself and call statistics.

pub mod bits;
pub mod encoder;
pub mod frozen;
pub mod matrix;
pub mod stats;

pub use bits::{format_bits, format_mask, parse_bits, parse_mask, Bit};
pub use encoder::{stage_count, Encoder, PolarMkEncoder, DEFAULT_PARALLEL_THRESHOLD};
pub use frozen::{info_bit_positions, FrozenBitObserver, FrozenBits};
pub use matrix::{kronecker_product, BitMatrix};
pub use stats::{EncodeStats, TimedEncoder};
