use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use sha3::Sha3_256;
use sha3::digest::consts::U1;
use sha3::digest::{Digest, FixedOutput, HashMarker, Output, OutputSizeUser, Update};

use alloc::vec::Vec;
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::param::{CodeFamily, CodeParams};
use crate::pke::{PrivateKey, PublicKey};
use crate::rm::ReedMuller25;
use crate::vect::{BitVector, Permutation};

/// Deterministic RNG for repeatable tests
pub type TestRng = ChaCha8Rng;

pub fn test_rng(seed: u64) -> TestRng {
    ChaCha8Rng::seed_from_u64(0xdead_beef ^ seed)
}

/// RM(2,5) key pair shared by the scheme tests
pub fn test_keypair() -> (PublicKey<ReedMuller25>, PrivateKey<ReedMuller25>) {
    ReedMuller25::generate_keypair(&mut test_rng(0)).expect("RM(2,5) key generation")
}

/// SHA3-256 cut down to its first byte.
///
/// The toy code only fits 12 bits into an error vector, too few for any real
/// digest.
#[derive(Clone, Default)]
pub struct TruncatedSha3(Sha3_256);

impl HashMarker for TruncatedSha3 {}

impl OutputSizeUser for TruncatedSha3 {
    type OutputSize = U1;
}

impl Update for TruncatedSha3 {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }
}

impl FixedOutput for TruncatedSha3 {
    fn finalize_into(self, out: &mut Output<Self>) {
        out[0] = self.0.finalize()[0];
    }
}

/// Shortened Hamming code `[522, 512]` correcting one error.
///
/// Positions `0..10` carry the parity bits, positions `10..522` the message.
/// Message position `10 + i` has the `i`-th 10-bit check column of weight at
/// least two, so every column is distinct and non-zero. The key carries the
/// identity permutation. Large enough for the Kobara–Imai fill to be
/// non-empty.
pub struct ShortHamming;

const HAMMING_R: usize = 10;
const HAMMING_K: usize = 512;
const HAMMING_N: usize = HAMMING_R + HAMMING_K;

#[derive(Clone, Zeroize)]
pub struct HammingColumns(Vec<u16>);

fn hamming_columns() -> HammingColumns {
    let parity = (0..HAMMING_R).map(|j| 1u16 << j);
    let message = (3u16..1 << HAMMING_R)
        .filter(|c| c.count_ones() >= 2)
        .take(HAMMING_K);
    HammingColumns(parity.chain(message).collect())
}

impl ShortHamming {
    pub fn params() -> CodeParams {
        CodeParams::new(HAMMING_N, HAMMING_K, 1).expect("valid Hamming parameters")
    }

    pub fn keypair() -> (PublicKey<Self>, PrivateKey<Self>) {
        let params = Self::params();
        let pk = PublicKey::new(params, hamming_columns());
        let sk = PrivateKey::new(params, Permutation::identity(HAMMING_N), hamming_columns())
            .expect("identity permutation fits");
        (pk, sk)
    }
}

impl CodeFamily for ShortHamming {
    type Generator = HammingColumns;
    type Trapdoor = HammingColumns;

    fn left_multiply(columns: &HammingColumns, m: &BitVector) -> BitVector {
        let mut out = BitVector::zero(HAMMING_N);
        let mut parity = 0u16;
        for i in (0..HAMMING_K).filter(|&i| m.bit(i)) {
            out.set_bit(HAMMING_R + i);
            parity ^= columns.0[HAMMING_R + i];
        }
        for j in (0..HAMMING_R).filter(|&j| (parity >> j) & 1 == 1) {
            out.set_bit(j);
        }
        out
    }

    fn syndrome(columns: &HammingColumns, c: &BitVector) -> BitVector {
        let s = (0..HAMMING_N)
            .filter(|&j| c.bit(j))
            .fold(0u16, |s, j| s ^ columns.0[j]);
        let mut out = BitVector::zero(HAMMING_R);
        for j in (0..HAMMING_R).filter(|&j| (s >> j) & 1 == 1) {
            out.set_bit(j);
        }
        out
    }

    fn syndrome_decode(columns: &HammingColumns, syndrome: &BitVector) -> Result<BitVector> {
        let s = (0..HAMMING_R)
            .filter(|&j| syndrome.bit(j))
            .fold(0u16, |s, j| s | 1 << j);
        let mut e = BitVector::zero(HAMMING_N);
        if s != 0 {
            let pos = columns.0.iter().position(|&c| c == s).ok_or(Error::Decoding)?;
            e.set_bit(pos);
        }
        Ok(e)
    }
}
