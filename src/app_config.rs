use crate::error::{PolarError, PolarResult};
use crate::polar::{
    parse_mask, Bit, BitMatrix, FrozenBits, PolarMkEncoder, DEFAULT_PARALLEL_THRESHOLD,
};
use serde::Deserialize;
use std::path::Path;

/// Code parameters parsed from the `[polar]` section of a TOML file.
#[derive(Clone, Debug, PartialEq)]
pub struct PolarConfig {
    pub k: usize,
    pub n: usize,
    /// `true` marks a frozen position.
    pub frozen_bits: Vec<bool>,
    pub kernel: BitMatrix,
    pub n_frames: usize,
    pub parallel_threshold: usize,
}

impl PolarConfig {
    /// Load configuration from a TOML string.
    ///
    /// The mask is given either as `frozen_bits = "1100"` ('1' = frozen) or
    /// as `info_positions = [2, 3]`; the kernel as a list of row strings.
    pub fn from_toml(s: &str) -> Result<Self, Box<dyn std::error::Error>> {
        #[derive(Deserialize)]
        struct Root {
            polar: Section,
        }

        #[derive(Deserialize)]
        struct Section {
            k: usize,
            n: usize,
            frozen_bits: Option<String>,
            info_positions: Option<Vec<usize>>,
            kernel: Option<Vec<String>>,
            n_frames: Option<usize>,
            parallel_threshold: Option<usize>,
        }

        let raw: Root = toml::from_str(s)?;
        let p = raw.polar;
        let frozen_bits = match (p.frozen_bits, p.info_positions) {
            (Some(mask), None) => parse_mask(&mask)?,
            (None, Some(positions)) => FrozenBits::from_info_positions(p.n, &positions)?.snapshot(),
            (Some(_), Some(_)) => {
                return Err(PolarError::from("set either frozen_bits or info_positions, not both").into())
            }
            (None, None) => {
                return Err(PolarError::from("missing frozen_bits or info_positions").into())
            }
        };
        let kernel = match p.kernel {
            Some(rows) => BitMatrix::parse(&rows.join(","))?,
            None => BitMatrix::arikan(),
        };

        Ok(PolarConfig {
            k: p.k,
            n: p.n,
            frozen_bits,
            kernel,
            n_frames: p.n_frames.unwrap_or(1),
            parallel_threshold: p.parallel_threshold.unwrap_or(DEFAULT_PARALLEL_THRESHOLD),
        })
    }

    /// Load configuration from a file path.
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Runs the same checks as encoder construction.
    pub fn validate(&self) -> PolarResult<()> {
        self.build_encoder::<u8>().map(|_| ())
    }

    pub fn build_encoder<B: Bit>(&self) -> PolarResult<PolarMkEncoder<B>> {
        let encoder = PolarMkEncoder::with_frames(
            self.k,
            self.n,
            FrozenBits::new(self.frozen_bits.clone()),
            self.kernel.clone(),
            self.n_frames,
        )?;
        Ok(encoder.with_parallel_threshold(self.parallel_threshold))
    }
}

impl Default for PolarConfig {
    fn default() -> Self {
        Self {
            k: 2,
            n: 4,
            frozen_bits: vec![true, true, false, false],
            kernel: BitMatrix::arikan(),
            n_frames: 1,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}
