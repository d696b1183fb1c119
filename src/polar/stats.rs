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

//! Call counting, timing and frame dumps for any [`Encoder`].

use super::bits::{format_bits, Bit};
use super::encoder::Encoder;
use super::frozen::FrozenBitObserver;
use crate::error::PolarResult;
use log::{debug, log_enabled, trace, Level};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Snapshot of the counters kept by a [`TimedEncoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeStats {
    pub n_calls: u64,
    pub total: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl EncodeStats {
    pub fn average(&self) -> Duration {
        if self.n_calls == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos((self.total.as_nanos() / self.n_calls as u128) as u64)
    }
}

/// Wraps an encoder and records per-frame call statistics.
///
/// Counters are atomics so the wrapped encoder stays usable from several
/// threads at once. With debug enabled, every frame's input and output bits
/// are logged at trace level, cut to `debug_limit` bits when one is set.
pub struct TimedEncoder<B: Bit, E: Encoder<B>> {
    inner: E,
    debug: bool,
    debug_limit: Option<usize>,
    n_calls: AtomicU64,
    total_ns: AtomicU64,
    min_ns: AtomicU64,
    max_ns: AtomicU64,
    _bits: PhantomData<fn() -> B>,
}

impl<B: Bit, E: Encoder<B>> TimedEncoder<B, E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            debug: false,
            debug_limit: None,
            n_calls: AtomicU64::new(0),
            total_ns: AtomicU64::new(0),
            min_ns: AtomicU64::new(u64::MAX),
            max_ns: AtomicU64::new(0),
            _bits: PhantomData,
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    /// Maximum number of bits dumped per frame; `None` dumps whole frames.
    pub fn set_debug_limit(&mut self, limit: Option<usize>) {
        self.debug_limit = limit;
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    fn dumps_frames(&self) -> bool {
        self.debug && log_enabled!(Level::Trace)
    }

    pub fn stats(&self) -> EncodeStats {
        let n_calls = self.n_calls.load(Ordering::Relaxed);
        let min = match self.min_ns.load(Ordering::Relaxed) {
            u64::MAX => 0,
            v => v,
        };
        EncodeStats {
            n_calls,
            total: Duration::from_nanos(self.total_ns.load(Ordering::Relaxed)),
            min: Duration::from_nanos(min),
            max: Duration::from_nanos(self.max_ns.load(Ordering::Relaxed)),
        }
    }

    pub fn reset_stats(&self) {
        self.n_calls.store(0, Ordering::Relaxed);
        self.total_ns.store(0, Ordering::Relaxed);
        self.min_ns.store(u64::MAX, Ordering::Relaxed);
        self.max_ns.store(0, Ordering::Relaxed);
        debug!("encoder statistics reset");
    }

    fn record(&self, elapsed: Duration) {
        let ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.n_calls.fetch_add(1, Ordering::Relaxed);
        self.total_ns.fetch_add(ns, Ordering::Relaxed);
        self.min_ns.fetch_min(ns, Ordering::Relaxed);
        self.max_ns.fetch_max(ns, Ordering::Relaxed);
    }
}

impl<B: Bit, E: Encoder<B>> Encoder<B> for TimedEncoder<B, E> {
    fn k(&self) -> usize {
        self.inner.k()
    }

    fn n(&self) -> usize {
        self.inner.n()
    }

    fn n_frames(&self) -> usize {
        self.inner.n_frames()
    }

    fn encode_frame(&self, u_k: &[B], x_n: &mut [B], frame_id: usize) -> PolarResult<()> {
        let dump = self.dumps_frames();
        if dump {
            trace!("frame {} in:  {}", frame_id, preview(u_k, self.debug_limit));
        }
        let start = Instant::now();
        self.inner.encode_frame(u_k, x_n, frame_id)?;
        self.record(start.elapsed());
        if dump {
            trace!("frame {} out: {}", frame_id, preview(x_n, self.debug_limit));
        }
        Ok(())
    }
}

// Bits as text, cut after `limit` with the remaining count appended.
fn preview<B: Bit>(bits: &[B], limit: Option<usize>) -> String {
    match limit {
        Some(limit) if bits.len() > limit => format!(
            "{}... ({} more)",
            format_bits(&bits[..limit]),
            bits.len() - limit
        ),
        _ => format_bits(bits),
    }
}

impl<B: Bit, E: Encoder<B> + FrozenBitObserver> FrozenBitObserver for TimedEncoder<B, E> {
    fn on_frozen_bits_changed(&mut self) -> PolarResult<()> {
        self.inner.on_frozen_bits_changed()
    }
}
