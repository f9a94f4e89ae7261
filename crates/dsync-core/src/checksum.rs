//! Adler-32 checksum, the encoding dCache reports as `ADLER32:`.
//!
//! The accumulator is folded block by block while the copier streams data,
//! so the checksum is known the moment the last byte is written.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Largest prime below 2^16.
const MOD_ADLER: u32 = 65521;

/// Max bytes that can be summed before `b` may overflow a u32 (zlib's NMAX).
const NMAX: usize = 5552;

/// Initial accumulator value.
pub const SEED: u32 = 1;

/// Running Adler-32 state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adler32 {
    value: u32,
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Adler32 {
    pub fn new() -> Self {
        Self { value: SEED }
    }

    /// Resume from a previously captured state.
    pub fn from_value(value: u32) -> Self {
        Self { value }
    }

    /// Fold `block` into the running state. Blocks must arrive in stream order.
    pub fn update(&mut self, block: &[u8]) {
        self.value = update(self.value, block);
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Render as 8 lowercase hex digits. Consumes the accumulator so it is finalized once.
    pub fn finalize(self) -> String {
        finalize(self.value)
    }
}

/// Fold `block` into `state` and return the new state.
pub fn update(state: u32, block: &[u8]) -> u32 {
    let mut a = state & 0xffff;
    let mut b = state >> 16;
    for chunk in block.chunks(NMAX) {
        for &byte in chunk {
            a += u32::from(byte);
            b += a;
        }
        a %= MOD_ADLER;
        b %= MOD_ADLER;
    }
    (b << 16) | a
}

/// Render a checksum state as 8 lowercase, zero-padded hex digits.
pub fn finalize(state: u32) -> String {
    hex::encode(state.to_be_bytes())
}

/// Compute the Adler-32 of a local file and return it rendered as hex.
pub fn adler32_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut sum = Adler32::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match f.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };
        sum.update(&buf[..n]);
    }
    Ok(sum.finalize())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Splitting the stream at arbitrary points never changes the checksum.
        #[test]
        fn chunking_invariance(
            data in prop::collection::vec(any::<u8>(), 0..20_000),
            cuts in prop::collection::vec(any::<usize>(), 0..16)
        ) {
            let whole = update(SEED, &data);

            let mut points: Vec<usize> = cuts
                .into_iter()
                .map(|c| if data.is_empty() { 0 } else { c % (data.len() + 1) })
                .collect();
            points.sort_unstable();

            let mut sum = Adler32::new();
            let mut start = 0;
            for p in points {
                sum.update(&data[start..p]);
                start = p;
            }
            sum.update(&data[start..]);
            prop_assert_eq!(sum.value(), whole);
        }

        /// Output is always 8 lowercase hex characters.
        #[test]
        fn rendering_is_fixed_width(state in any::<u32>()) {
            let s = finalize(state);
            prop_assert_eq!(s.len(), 8);
            prop_assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
            prop_assert_eq!(u32::from_str_radix(&s, 16).unwrap(), state);
        }
    }
}
