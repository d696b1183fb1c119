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

//! # Frozen Bits
//!
//! The frozen-bit mask is owned by whoever designs the code and shared with
//! every component that depends on it (encoder, decoder, designer). `FrozenBits`
//! is that shared handle. Dependents cache derived state and refresh it when
//! the owner calls [`FrozenBitObserver::on_frozen_bits_changed`]; nothing
//! watches the mask for changes on its own.

use crate::error::{PolarError, PolarResult};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

/// Shared, mutable frozen-bit mask. `true` means frozen (forced to 0).
#[derive(Clone, Debug, Default)]
pub struct FrozenBits {
    mask: Arc<RwLock<Vec<bool>>>,
}

impl FrozenBits {
    pub fn new(mask: Vec<bool>) -> Self {
        Self {
            mask: Arc::new(RwLock::new(mask)),
        }
    }

    /// Builds a mask of length `n` where only `positions` carry information.
    pub fn from_info_positions(n: usize, positions: &[usize]) -> PolarResult<Self> {
        let mut mask = vec![true; n];
        for &position in positions {
            check_position(position, n)?;
            mask[position] = false;
        }
        Ok(Self::new(mask))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Vec<bool>> {
        self.mask.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Vec<bool> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Number of positions that carry information bits.
    pub fn info_count(&self) -> usize {
        self.read().iter().filter(|&&f| !f).count()
    }

    /// Replaces the whole mask. Dependents must be notified afterwards.
    pub fn replace(&self, mask: Vec<bool>) {
        *self.mask.write().unwrap_or_else(PoisonError::into_inner) = mask;
    }

    /// Swaps the roles of two positions, keeping the information count unchanged.
    pub fn swap(&self, a: usize, b: usize) -> PolarResult<()> {
        let mut mask = self.mask.write().unwrap_or_else(PoisonError::into_inner);
        check_position(a, mask.len())?;
        check_position(b, mask.len())?;
        mask.swap(a, b);
        Ok(())
    }

    /// Sets a single position. Dependents must be notified afterwards.
    pub fn set(&self, index: usize, frozen: bool) -> PolarResult<()> {
        let mut mask = self.mask.write().unwrap_or_else(PoisonError::into_inner);
        check_position(index, mask.len())?;
        mask[index] = frozen;
        Ok(())
    }

    /// True if both handles point at the same underlying mask.
    pub fn shares_with(&self, other: &FrozenBits) -> bool {
        Arc::ptr_eq(&self.mask, &other.mask)
    }
}

impl From<Vec<bool>> for FrozenBits {
    fn from(mask: Vec<bool>) -> Self {
        Self::new(mask)
    }
}

/// Implemented by components whose state derives from a frozen-bit mask.
pub trait FrozenBitObserver {
    /// Re-derives cached state from the current mask.
    fn on_frozen_bits_changed(&mut self) -> PolarResult<()>;
}

/// Ascending indices of the non-frozen positions.
pub fn info_bit_positions(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &frozen)| (!frozen).then_some(i))
        .collect()
}

fn check_position(position: usize, n: usize) -> PolarResult<()> {
    if position >= n {
        return Err(PolarError::PositionOutOfRange { position, n });
    }
    Ok(())
}

/// Checks a mask against the code dimensions.
pub(crate) fn check_mask(mask: &[bool], k: usize, n: usize) -> PolarResult<()> {
    if mask.len() != n {
        return Err(PolarError::LengthMismatch {
            what: "frozen bits",
            expected: n,
            actual: mask.len(),
        });
    }
    let info = mask.iter().filter(|&&f| !f).count();
    if info != k {
        return Err(PolarError::InfoCountMismatch {
            expected: k,
            actual: info,
        });
    }
    Ok(())
}
