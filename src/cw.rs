//! Constant-weight codec
//!
//! Bijection between the integers `[0, C(n,t))` and the binary vectors of
//! length `n` and Hamming weight `t`, using the lexicographic ranking of
//! combinations.
//!
//! Both directions walk the positions `j = 0..n` while tracking `c`, the number
//! of weight-`tt` completions of the remaining `nn` positions. The binomial is
//! never recomputed: every step updates `c` with an exact division.
//!
//! 1. `c <- c * (nn - tt) / nn`, `nn <- nn - 1` (completions with bit `j` clear)
//! 2. bit `j` set: `rank += c`, `tt <- tt - 1`, then `c <- 1` if `nn == tt`,
//!    else `c <- c * (tt + 1) / (nn - tt)`

use alloc::vec::Vec;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::{Error, Result};
use crate::vect::BitVector;

#[inline]
fn big(v: usize) -> BigUint {
    BigUint::from(v as u64)
}

/// Binomial coefficient `C(n, t)`, zero when `t > n`.
#[must_use]
pub fn binomial(n: usize, t: usize) -> BigUint {
    if t > n {
        return BigUint::zero();
    }
    let t = t.min(n - t);
    let mut c = BigUint::one();
    for i in 0..t {
        c = c * big(n - i) / big(i + 1);
    }
    c
}

/// `floor(log2 C(n, t))`, the number of bits that always fit into a weight-`t`
/// vector of length `n`.
///
/// Returns zero when `t > n`.
#[must_use]
pub fn error_space_bits(n: usize, t: usize) -> usize {
    let c = binomial(n, t);
    if c.is_zero() {
        return 0;
    }
    c.bits() as usize - 1
}

/// One step of the ranking recurrence: the completions with the current bit clear.
#[inline]
fn step_clear(c: &BigUint, nn: usize, tt: usize) -> BigUint {
    c * big(nn - tt) / big(nn)
}

/// Completions after a set bit, with `nn` and `tt` already decremented.
#[inline]
fn step_set(c: &BigUint, nn: usize, tt: usize) -> BigUint {
    if nn == tt {
        BigUint::one()
    } else {
        c * big(tt + 1) / big(nn - tt)
    }
}

/// Maps the big-endian integer `m` to a vector of length `n` and weight `t`.
///
/// # Errors
/// [`Error::Argument`] if `n < t` or `m >= C(n, t)`.
pub fn encode(n: usize, t: usize, m: &[u8]) -> Result<BitVector> {
    if n < t {
        return Err(Error::Argument("n < t"));
    }
    let mut c = binomial(n, t);
    let mut i = BigUint::from_bytes_be(m);
    if i >= c {
        return Err(Error::Argument("encoded number too large"));
    }

    let mut out = BitVector::zero(n);
    let (mut nn, mut tt) = (n, t);
    for j in 0..n {
        c = step_clear(&c, nn, tt);
        nn -= 1;
        if c <= i {
            out.set_bit(j);
            i -= &c;
            tt -= 1;
            c = step_set(&c, nn, tt);
        }
    }
    Ok(out)
}

/// Rank of a weight-`t` vector of length `n`.
pub(crate) fn rank(n: usize, t: usize, v: &BitVector) -> Result<BigUint> {
    if n < t {
        return Err(Error::Argument("n < t"));
    }
    if v.len() != n {
        return Err(Error::Argument("vector length differs from n"));
    }
    if v.weight() != t {
        return Err(Error::Argument("vector weight differs from t"));
    }

    let mut c = binomial(n, t);
    let mut i = BigUint::zero();
    let (mut nn, mut tt) = (n, t);
    for j in 0..n {
        c = step_clear(&c, nn, tt);
        nn -= 1;
        if v.bit(j) {
            i += &c;
            tt -= 1;
            c = step_set(&c, nn, tt);
        }
    }
    Ok(i)
}

/// Inverse of [`encode`]: the minimal big-endian encoding of the rank of `v`.
///
/// Rank zero encodes as the single byte `0x00`.
///
/// # Errors
/// [`Error::Argument`] if `n < t`, `v.len() != n` or `v.weight() != t`.
pub fn decode(n: usize, t: usize, v: &BitVector) -> Result<Vec<u8>> {
    Ok(rank(n, t, v)?.to_bytes_be())
}

/// Fixed-length message representative of `ceil(s / 8)` bytes, where
/// `s = floor(log2 C(n, t))`.
///
/// Ranks the set bits among the low `s` bits of `m` (bit `j` is bit `j % 8` of
/// byte `j / 8`) as if they were the leading positions of a weight-`t` vector,
/// stopping once `t` bits have been ranked. The rank is reduced modulo `2^s`
/// and written big-endian.
///
/// # Errors
/// [`Error::Argument`] if `n < t`.
pub fn sign_conversion(n: usize, t: usize, m: &[u8]) -> Result<Vec<u8>> {
    if n < t {
        return Err(Error::Argument("n < t"));
    }
    let mut c = binomial(n, t);
    let s = c.bits() as usize - 1;

    let bit = |j: usize| m.get(j >> 3).is_some_and(|b| (b >> (j & 7)) & 1 == 1);

    let mut acc = BigUint::zero();
    let (mut nn, mut tt) = (n, t);
    for j in 0..s {
        // no completion left to rank against
        if tt == 0 || nn < tt {
            break;
        }
        c = step_clear(&c, nn, tt);
        nn -= 1;
        if bit(j) {
            acc += &c;
            tt -= 1;
            c = step_set(&c, nn, tt);
        }
    }

    let acc = acc % (BigUint::one() << s);
    let be = acc.to_bytes_be();
    let mut out = alloc::vec![0u8; s.div_ceil(8)];
    // `acc < 2^s` fits; zero is encoded by `to_bytes_be` as one byte
    let be = if acc.is_zero() { &[][..] } else { &be[..] };
    out[s.div_ceil(8) - be.len()..].copy_from_slice(be);
    Ok(out)
}
