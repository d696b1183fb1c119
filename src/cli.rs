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

//! Command line options for the `polar-mk` binary.

use crate::app_config::PolarConfig;
use crate::polar::{parse_mask, BitMatrix};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct CommandLineOptions {
    /// TOML file with a [polar] section
    #[clap(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Information length K (defaults to the number of unfrozen positions)
    #[clap(short, long, global = true)]
    pub k: Option<usize>,

    /// Codeword length N (defaults to the mask length)
    #[clap(short, long, global = true)]
    pub n: Option<usize>,

    /// Frozen-bit mask, '1' marks a frozen position
    #[clap(short, long, global = true)]
    pub frozen: Option<String>,

    /// Kernel rows separated by commas, e.g. 100,110,111
    #[clap(long, global = true)]
    pub kernel: Option<String>,

    /// Number of frames encoded per call
    #[clap(long, global = true)]
    pub frames: Option<usize>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Encodes K information bits per frame and prints one codeword per line
    Encode {
        /// Information bits, e.g. 1011
        #[clap(required = true)]
        bits: String,
        /// Log every frame's input and output bits at trace level
        #[clap(long)]
        dump: bool,
        /// Maximum number of bits logged per dumped frame
        #[clap(long)]
        dump_limit: Option<usize>,
    },
    /// Checks whether each N-bit frame is a codeword of the configured code
    Check {
        #[clap(required = true)]
        codeword: String,
    },
    /// Prints the N×N generator matrix
    Generator,
}

impl CommandLineOptions {
    /// Starts from the config file (or the built-in default) and applies the
    /// command line overrides on top.
    pub fn load_config(&self) -> Result<PolarConfig, Box<dyn std::error::Error>> {
        let cfg = match &self.config {
            Some(path) => PolarConfig::from_file(path)?,
            None => PolarConfig::default(),
        };
        self.apply_overrides(cfg)
    }

    pub fn apply_overrides(
        &self,
        mut cfg: PolarConfig,
    ) -> Result<PolarConfig, Box<dyn std::error::Error>> {
        if let Some(frozen) = &self.frozen {
            cfg.frozen_bits = parse_mask(frozen)?;
            cfg.n = cfg.frozen_bits.len();
            cfg.k = cfg.frozen_bits.iter().filter(|&&f| !f).count();
        }
        if let Some(k) = self.k {
            cfg.k = k;
        }
        if let Some(n) = self.n {
            cfg.n = n;
        }
        if let Some(kernel) = &self.kernel {
            cfg.kernel = BitMatrix::parse(kernel)?;
        }
        if let Some(frames) = self.frames {
            cfg.n_frames = frames;
        }
        info!(
            "code: K={}, N={}, kernel size {}, {} frame(s)",
            cfg.k,
            cfg.n,
            cfg.kernel.size(),
            cfg.n_frames
        );
        Ok(cfg)
    }
}
