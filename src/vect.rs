//! Binary vectors and coordinate permutations.
//!
//! Vectors in F_2^n are stored as `ceil(n / 8)` bytes. Bit `j` lives in byte
//! `j / 8` at position `j % 8` (little-endian within each byte), which is also
//! the wire encoding of primitive ciphertexts. Bits above `n` in the last byte
//! are always zero.
//!
//! Critical: vectors often hold secrets (error vectors, random seeds). They
//! zeroize through [`Zeroize`] and compare through [`ConstantTimeEq`].

use alloc::{vec, vec::Vec};

use rand_core::{CryptoRng, RngCore};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

use crate::error::{Error, Result};

/// F2^n vector, bit `j` stored at byte `j / 8`, bit `j % 8`.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize)]
pub struct BitVector {
    len: usize,
    bytes: Vec<u8>,
}

/// Mask of the valid bits in the last byte of a `len`-bit vector.
#[inline]
fn last_byte_mask(len: usize) -> u8 {
    match len % 8 {
        0 => 0xff,
        rem => (1u8 << rem) - 1,
    }
}

impl BitVector {
    /// The all-zero vector of `len` bits.
    #[must_use]
    pub fn zero(len: usize) -> Self {
        Self {
            len,
            bytes: vec![0u8; len.div_ceil(8)],
        }
    }

    /// OS2VP: parse exactly `ceil(len / 8)` bytes into a `len`-bit vector.
    ///
    /// Bits above `len` are cleared; use [`padding_is_clear`] to reject
    /// non-canonical encodings.
    pub fn from_bytes(len: usize, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != len.div_ceil(8) {
            return Err(Error::Argument("byte length does not match vector length"));
        }
        let mut v = Self {
            len,
            bytes: bytes.to_vec(),
        };
        v.clear_padding();
        Ok(v)
    }

    /// Parse a prefix of at most `ceil(len / 8)` bytes; missing bytes are zero.
    pub fn from_prefix_bytes(len: usize, bytes: &[u8]) -> Result<Self> {
        let mut v = Self::zero(len);
        if bytes.len() > v.bytes.len() {
            return Err(Error::Argument("too many bytes for vector length"));
        }
        v.bytes[..bytes.len()].copy_from_slice(bytes);
        v.clear_padding();
        Ok(v)
    }

    /// Builds a vector from its support (the positions of its set bits).
    pub fn from_support(len: usize, support: &[usize]) -> Result<Self> {
        let mut v = Self::zero(len);
        for &pos in support {
            if pos >= len {
                return Err(Error::Argument("support index out of range"));
            }
            v.set_bit(pos);
        }
        Ok(v)
    }

    /// Uniformly random vector of `len` bits.
    pub fn random<R: RngCore + CryptoRng>(len: usize, rng: &mut R) -> Self {
        let mut v = Self::zero(len);
        rng.fill_bytes(&mut v.bytes);
        v.clear_padding();
        v
    }

    /// Length in bits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for the zero-length vector.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The byte encoding, `ceil(len / 8)` bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The byte encoding as an owned buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Value of bit `i`.
    ///
    /// # Panics
    /// Panics if `i >= len`.
    #[inline]
    #[must_use]
    pub fn bit(&self, i: usize) -> bool {
        assert!(i < self.len, "bit index out of range");
        (self.bytes[i >> 3] >> (i & 7)) & 1 == 1
    }

    /// Sets bit `i` to one.
    ///
    /// # Panics
    /// Panics if `i >= len`.
    #[inline]
    pub fn set_bit(&mut self, i: usize) {
        assert!(i < self.len, "bit index out of range");
        self.bytes[i >> 3] |= 1u8 << (i & 7);
    }

    /// Hamming weight.
    #[must_use]
    pub fn weight(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Vector addition in F_2^n.
    pub fn xor(&self, other: &Self) -> Result<Self> {
        let mut out = self.clone();
        out.xor_assign(other)?;
        Ok(out)
    }

    /// In-place vector addition in F_2^n.
    pub fn xor_assign(&mut self, other: &Self) -> Result<()> {
        if self.len != other.len {
            return Err(Error::Argument("vector lengths differ"));
        }
        for (a, b) in self.bytes.iter_mut().zip(&other.bytes) {
            *a ^= b;
        }
        Ok(())
    }

    /// The right-most `k` bits: bit `i` of the result is bit `len - k + i`.
    pub fn right_bits(&self, k: usize) -> Result<Self> {
        if k > self.len {
            return Err(Error::Argument("cannot extract more bits than the vector holds"));
        }
        let offset = self.len - k;
        let mut out = Self::zero(k);
        if offset % 8 == 0 {
            let start = offset / 8;
            out.bytes.copy_from_slice(&self.bytes[start..]);
        } else {
            for i in 0..k {
                if self.bit(offset + i) {
                    out.set_bit(i);
                }
            }
        }
        Ok(out)
    }

    fn clear_padding(&mut self) {
        let mask = last_byte_mask(self.len);
        if let Some(last) = self.bytes.last_mut() {
            *last &= mask;
        }
    }
}

impl ConstantTimeEq for BitVector {
    fn ct_eq(&self, other: &Self) -> Choice {
        (self.len as u64).ct_eq(&(other.len as u64)) & self.bytes.as_slice().ct_eq(&other.bytes)
    }
}

/// Whether the bits above `len` in an encoded `len`-bit vector are zero.
///
/// `bytes` must already have the right length.
#[must_use]
pub fn padding_is_clear(len: usize, bytes: &[u8]) -> Choice {
    let mask = last_byte_mask(len);
    match bytes.last() {
        Some(last) => (last & !mask).ct_eq(&0),
        None => Choice::from(1),
    }
}

/// A permutation of the coordinates `0..n`.
///
/// Applying it to `v` yields `w` with `w[i] = v[perm[i]]`.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize)]
pub struct Permutation {
    perm: Vec<usize>,
}

impl Permutation {
    /// The identity permutation on `n` coordinates.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self {
            perm: (0..n).collect(),
        }
    }

    /// Validates that `perm` is a permutation of `0..perm.len()`.
    pub fn from_vec(perm: Vec<usize>) -> Result<Self> {
        let mut seen = vec![false; perm.len()];
        for &p in &perm {
            match seen.get_mut(p) {
                Some(s) if !*s => *s = true,
                _ => return Err(Error::Argument("not a permutation")),
            }
        }
        Ok(Self { perm })
    }

    /// Uniformly random permutation (Fisher–Yates with rejection sampling).
    pub fn random<R: RngCore + CryptoRng>(n: usize, rng: &mut R) -> Self {
        let mut perm: Vec<usize> = (0..n).collect();
        for i in (1..n).rev() {
            let j = uniform_below(rng, i as u64 + 1) as usize;
            perm.swap(i, j);
        }
        Self { perm }
    }

    /// Number of coordinates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.perm.len()
    }

    /// True for the permutation of zero coordinates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.perm.is_empty()
    }

    /// The images, `perm[i]` for each coordinate `i`.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.perm
    }

    /// The inverse permutation.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut inv = vec![0usize; self.perm.len()];
        for (i, &p) in self.perm.iter().enumerate() {
            inv[p] = i;
        }
        Self { perm: inv }
    }

    /// Permutes the coordinates of `v`.
    pub fn apply(&self, v: &BitVector) -> Result<BitVector> {
        if v.len() != self.perm.len() {
            return Err(Error::Argument("permutation and vector lengths differ"));
        }
        let mut out = BitVector::zero(v.len());
        for (i, &p) in self.perm.iter().enumerate() {
            if v.bit(p) {
                out.set_bit(i);
            }
        }
        Ok(out)
    }
}

/// Uniform integer in `[0, bound)` using rejection sampling on 64-bit draws.
fn uniform_below<R: RngCore + CryptoRng>(rng: &mut R, bound: u64) -> u64 {
    debug_assert!(bound > 0);
    // `[0, limit)` is a whole number of blocks of `bound` values.
    let limit = u64::MAX - (u64::MAX % bound);
    loop {
        let x = rng.next_u64();
        if x < limit {
            return x % bound;
        }
    }
}
