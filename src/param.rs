//! Code parameters and the code-algebra seam.

use crate::cw;
use crate::error::{Error, Result};
use crate::vect::BitVector;

/// Parameters `(n, k, t)` of a binary linear code correcting `t` errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CodeParams {
    n: usize,
    k: usize,
    t: usize,
}

impl CodeParams {
    /// Checks `n >= t >= 1` and `8 <= k < n`.
    ///
    /// Every conversion needs at least one whole byte of message space, hence
    /// the lower bound on `k`.
    pub fn new(n: usize, k: usize, t: usize) -> Result<Self> {
        if t == 0 {
            return Err(Error::InvalidParameters("t must be positive"));
        }
        if n < t {
            return Err(Error::InvalidParameters("n < t"));
        }
        if k >= n {
            return Err(Error::InvalidParameters("k must be smaller than n"));
        }
        if k < 8 {
            return Err(Error::InvalidParameters("k must be at least 8"));
        }
        Ok(Self { n, k, t })
    }

    /// Code length.
    #[must_use]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Code dimension.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Error-correcting capability.
    #[must_use]
    pub fn t(&self) -> usize {
        self.t
    }

    /// Bytes of a primitive ciphertext, `ceil(n / 8)`.
    #[must_use]
    pub fn ciphertext_bytes(&self) -> usize {
        self.n.div_ceil(8)
    }

    /// `floor(log2 C(n, t))`.
    #[must_use]
    pub fn error_space_bits(&self) -> usize {
        cw::error_space_bits(self.n, self.t)
    }
}

/// The algebra of a code family, as used by the McEliece primitive.
///
/// `Generator` is the public generator matrix `G` (`k x n`), `Trapdoor` is
/// whatever the private decoder needs (parity-check matrix, Goppa polynomial,
/// tables). The permutation of the private key is handled by the primitive.
pub trait CodeFamily {
    /// Public generator matrix.
    type Generator;
    /// Private decoding structure.
    type Trapdoor: zeroize::Zeroize;

    /// `m * G` for a `k`-bit message.
    fn left_multiply(generator: &Self::Generator, m: &BitVector) -> BitVector;

    /// Syndrome `H * c` of an `n`-bit word.
    fn syndrome(trapdoor: &Self::Trapdoor, c: &BitVector) -> BitVector;

    /// Error vector of weight at most `t` with the given syndrome.
    ///
    /// # Errors
    /// [`Error::Decoding`] if no such vector is known to the decoder.
    fn syndrome_decode(trapdoor: &Self::Trapdoor, syndrome: &BitVector) -> Result<BitVector>;
}
