//! Reed–Muller RM(2,5) reference code.
//!
//! `[n = 32, k = 16, d = 8]`, correcting `t = 3` errors. The code is self-dual,
//! so the same 16 monomial rows serve as generator and parity-check matrix.
//! Position `x` of a word is the evaluation point `x in F_2^5`; the row of the
//! monomial with variable set `mask` has bit `x` set iff `x & mask == mask`.
//!
//! Decoding is a lookup in the table of all 5489 coset leaders of weight at
//! most 3. This is a test and benchmark fixture, not a secure McEliece
//! instance: the code is tiny and the lookup is not constant-time.

use alloc::vec::Vec;

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::param::{CodeFamily, CodeParams};
use crate::pke::{PrivateKey, PublicKey};
use crate::vect::{BitVector, Permutation};

const N: usize = 32;
const K: usize = 16;
const T: usize = 3;

/// Permutations tried by [`ReedMuller25::generate_keypair`] before giving up.
const MAX_KEYGEN_ATTEMPTS: usize = 1024;

/// Monomial rows of degree at most 2 over 5 variables.
const fn monomial_rows() -> [u32; K] {
    let mut rows = [0u32; K];
    let mut r = 0;
    let mut mask = 0u32;
    while mask < 32 {
        if mask.count_ones() <= 2 {
            let mut word = 0u32;
            let mut x = 0u32;
            while x < 32 {
                if x & mask == mask {
                    word |= 1 << x;
                }
                x += 1;
            }
            rows[r] = word;
            r += 1;
        }
        mask += 1;
    }
    rows
}

const ROWS: [u32; K] = monomial_rows();

/// The RM(2,5) code family.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReedMuller25;

/// Public generator in systematic form: row `i` has the identity at column
/// `16 + i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RmGenerator {
    rows: [u32; K],
}

/// Syndrome table of all correctable error patterns.
///
/// Entries are `syndrome << 32 | error`, sorted.
#[derive(Clone, Zeroize)]
pub struct RmTrapdoor {
    table: Vec<u64>,
}

fn to_word(v: &BitVector) -> u32 {
    let mut bytes = [0u8; 4];
    bytes[..v.as_bytes().len()].copy_from_slice(v.as_bytes());
    u32::from_le_bytes(bytes)
}

fn from_word(len: usize, word: u32) -> Result<BitVector> {
    BitVector::from_bytes(len, &word.to_le_bytes()[..len.div_ceil(8)])
}

fn syndrome_word(c: u32) -> u32 {
    ROWS.iter()
        .enumerate()
        .fold(0, |s, (i, row)| s | ((row & c).count_ones() & 1) << i)
}

/// `out[i] = row[perm[i]]`.
fn permute_word(row: u32, perm: &[usize]) -> u32 {
    perm.iter()
        .enumerate()
        .fold(0, |acc, (i, &p)| acc | ((row >> p) & 1) << i)
}

/// Row-reduces `rows` to the identity on columns `16..32`.
///
/// Returns `None` if those columns are linearly dependent.
fn systematic_form(mut rows: [u32; K]) -> Option<[u32; K]> {
    for i in 0..K {
        let bit = 1u32 << (N - K + i);
        let pivot = (i..K).find(|&r| rows[r] & bit != 0)?;
        rows.swap(i, pivot);
        for r in 0..K {
            if r != i && rows[r] & bit != 0 {
                rows[r] ^= rows[i];
            }
        }
    }
    Some(rows)
}

impl ReedMuller25 {
    /// `(32, 16, 3)`.
    pub fn params() -> Result<CodeParams> {
        CodeParams::new(N, K, T)
    }

    /// Builds the syndrome table.
    #[must_use]
    pub fn trapdoor() -> RmTrapdoor {
        let mut table = Vec::with_capacity(5489);
        table.push(0u64);
        for a in 0..N {
            let ea = 1u32 << a;
            table.push(entry(ea));
            for b in a + 1..N {
                let eb = ea | 1 << b;
                table.push(entry(eb));
                for c in b + 1..N {
                    table.push(entry(eb | 1 << c));
                }
            }
        }
        table.sort_unstable();
        RmTrapdoor { table }
    }

    /// Random key pair: a secret permutation of the coordinates and the
    /// systematic form of the permuted generator.
    ///
    /// # Errors
    /// [`Error::InvalidParameters`] if no permutation with an information set
    /// on the last 16 coordinates is found.
    pub fn generate_keypair<R: RngCore + CryptoRng>(
        rng: &mut R,
    ) -> Result<(PublicKey<Self>, PrivateKey<Self>)> {
        let params = Self::params()?;
        for attempt in 1..=MAX_KEYGEN_ATTEMPTS {
            let perm = Permutation::random(N, rng);
            let permuted = ROWS.map(|row| permute_word(row, perm.as_slice()));
            if let Some(rows) = systematic_form(permuted) {
                log::debug!("RM(2,5) key pair after {attempt} permutation(s)");
                let pk = PublicKey::new(params, RmGenerator { rows });
                let sk = PrivateKey::new(params, perm, Self::trapdoor())?;
                return Ok((pk, sk));
            }
        }
        Err(Error::InvalidParameters("no systematic generator found"))
    }
}

fn entry(error: u32) -> u64 {
    (u64::from(syndrome_word(error)) << 32) | u64::from(error)
}

impl CodeFamily for ReedMuller25 {
    type Generator = RmGenerator;
    type Trapdoor = RmTrapdoor;

    fn left_multiply(generator: &RmGenerator, m: &BitVector) -> BitVector {
        let word = (0..K.min(m.len()))
            .filter(|&i| m.bit(i))
            .fold(0u32, |acc, i| acc ^ generator.rows[i]);
        let mut out = BitVector::zero(N);
        for j in (0..N).filter(|&j| (word >> j) & 1 == 1) {
            out.set_bit(j);
        }
        out
    }

    fn syndrome(_trapdoor: &RmTrapdoor, c: &BitVector) -> BitVector {
        let s = syndrome_word(to_word(c));
        let mut out = BitVector::zero(K);
        for i in (0..K).filter(|&i| (s >> i) & 1 == 1) {
            out.set_bit(i);
        }
        out
    }

    fn syndrome_decode(trapdoor: &RmTrapdoor, syndrome: &BitVector) -> Result<BitVector> {
        let s = u64::from(to_word(syndrome));
        let idx = trapdoor
            .table
            .binary_search_by_key(&s, |e| e >> 32)
            .map_err(|_| Error::Decoding)?;
        from_word(N, trapdoor.table[idx] as u32)
    }
}
