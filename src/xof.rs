//! Hash and KDF stream utilities
//!
//! The conversions use two symmetric primitives: a fixed-output hash `H`
//! (any [`Digest`]) and a KDF stream, the output of an extendable-output
//! function keyed with a seed. SHA3-256 and SHAKE256 are the defaults.

use alloc::vec::Vec;

use sha3::digest::{Digest, ExtendableOutput, Update, XofReader};
use zeroize::Zeroizing;

/// Deterministic byte stream `KDF(seed)`.
pub struct KdfStream<X: ExtendableOutput> {
    reader: X::Reader,
}

impl<X: Default + Update + ExtendableOutput> KdfStream<X> {
    /// Absorbs `seed` and switches to squeezing.
    pub fn init(seed: &[u8]) -> Self {
        let mut xof = X::default();
        xof.update(seed);
        Self {
            reader: xof.finalize_xof(),
        }
    }

    /// Fills `out` with the next stream bytes.
    pub fn squeeze(&mut self, out: &mut [u8]) {
        self.reader.read(out);
    }

    /// XORs the next `buf.len()` stream bytes into `buf`.
    pub fn apply_keystream(&mut self, buf: &mut [u8]) {
        let mut block = Zeroizing::new([0u8; 64]);
        for chunk in buf.chunks_mut(64) {
            let ks = &mut block[..chunk.len()];
            self.reader.read(ks);
            for (b, k) in chunk.iter_mut().zip(ks.iter()) {
                *b ^= k;
            }
        }
    }
}

/// `H(parts[0] || parts[1] || ...)`.
pub(crate) fn hash<H: Digest>(parts: &[&[u8]]) -> Zeroizing<Vec<u8>> {
    let mut hasher = H::new();
    for part in parts {
        Digest::update(&mut hasher, part);
    }
    Zeroizing::new(hasher.finalize().to_vec())
}
