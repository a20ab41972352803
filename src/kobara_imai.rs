//! Kobara–Imai conversion.
//!
//! The plaintext is masked and repartitioned so that the primitive's whole
//! capacity carries ciphertext bits: `k` bits go into the message vector,
//! `floor(log2 C(n,t))` bits into the error vector, and the rest travels in
//! the clear next to the primitive ciphertext.
//!
//! Encrypt(m):
//! 1. `mConst = m || Info`
//! 2. `c1 = KDF(r) xor mConst` for a fresh random `r` of digest size
//! 3. `c2 = H(c1) xor r`
//! 4. split `c2 || c1` into `c6 || c5 || c4` with `|c4| = floor(k / 8)` and
//!    `|c5| = floor(s / 8)`
//! 5. `z = Encode(n, t, c5)`, `enc = McEliece.Encrypt(pk, c4, z)`
//! 6. output `c6 || enc`
//!
//! When `c2 || c1` would be shorter than `c5 || c4`, the plaintext is first
//! extended to the fill length as `m || 0x80 || 0x00..` and [`INFO`] is
//! replaced by its bitwise complement, so that a filled plaintext is never
//! mistaken for one of exactly the fill length. `c6` is then empty.

use alloc::vec::Vec;
use core::marker::PhantomData;

use num_traits::Zero;
use rand_core::{CryptoRng, RngCore};
use sha3::digest::{Digest, ExtendableOutput, Update};
use sha3::{Sha3_256, Shake256};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroizing;

use crate::cca2::{Cca2Cipher, Key, SchemeState, finish, open_primitive, primitive_len};
use crate::cw;
use crate::error::{Error, Result};
use crate::param::CodeFamily;
use crate::pke::McEliecePke;
use crate::vect::BitVector;
use crate::xof::{KdfStream, hash};

/// Public constant appended to every plaintext.
pub const INFO: &[u8] = b"a predetermined public constant";

/// Takes the place of [`INFO`] after a plaintext extended to the fill length.
const FILL_INFO: [u8; INFO.len()] = complement(INFO);

/// First byte of the fill following a short plaintext.
const TERMINATOR: u8 = 0x80;

const fn complement<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let mut i = 0;
    while i < N {
        out[i] = !bytes[i];
        i += 1;
    }
    out
}

/// Kobara–Imai CCA2 conversion of the McEliece primitive.
pub struct KobaraImaiCipher<'k, C: CodeFamily, R, H = Sha3_256, X = Shake256> {
    state: SchemeState<'k, C, R>,
    /// Bytes carried by the message vector.
    c4_len: usize,
    /// Bytes carried by the error vector.
    c5_len: usize,
    /// Plaintexts shorter than this are extended to it.
    fill: usize,
    _hash: PhantomData<fn() -> (H, X)>,
}

impl<'k, C, R, H, X> KobaraImaiCipher<'k, C, R, H, X>
where
    C: CodeFamily,
    R: RngCore + CryptoRng,
    H: Digest,
    X: Default + Update + ExtendableOutput,
{
    /// Initializes the conversion for the mode selected by `key`.
    pub fn new(key: Key<'k, C>, rng: R) -> Result<Self> {
        let params = *key.params();
        let c4_len = params.k() / 8;
        let c5_len = params.error_space_bits() / 8;
        let fill = (c4_len + c5_len).saturating_sub(Self::digest_len() + INFO.len());
        Ok(Self {
            state: SchemeState::new(key, rng, "Kobara-Imai"),
            c4_len,
            c5_len,
            fill,
            _hash: PhantomData,
        })
    }

    fn digest_len() -> usize {
        <H as Digest>::output_size()
    }

    /// `|c6|` for a plaintext of `plaintext_len` bytes, zero at or below the
    /// fill length.
    fn c6_len(&self, plaintext_len: usize) -> usize {
        (Self::digest_len() + plaintext_len + INFO.len()).saturating_sub(self.c4_len + self.c5_len)
    }
}

impl<C, R, H, X> Cca2Cipher for KobaraImaiCipher<'_, C, R, H, X>
where
    C: CodeFamily,
    R: RngCore + CryptoRng,
    H: Digest,
    X: Default + Update + ExtendableOutput,
{
    const OID: &'static str = "1.3.6.1.4.1.8301.3.1.3.4.2.3";

    fn max_plaintext(&self) -> usize {
        self.state.max_plaintext()
    }

    fn ciphertext_len(&self, plaintext_len: usize) -> usize {
        self.c6_len(plaintext_len) + self.state.params().ciphertext_bytes()
    }

    fn encrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let pk = self.state.public_key()?;
        self.state.check_plaintext(input.len())?;
        let params = *pk.params();
        let filled = input.len() < self.fill;
        let body_len = if filled { self.fill } else { input.len() };

        // Step 1: m || Info, or m || 0x80 || 0.. || ~Info below the fill length
        let mut c1 = Zeroizing::new(alloc::vec![0u8; body_len + INFO.len()]);
        c1[..input.len()].copy_from_slice(input);
        if filled {
            c1[input.len()] = TERMINATOR;
            c1[body_len..].copy_from_slice(&FILL_INFO);
        } else {
            c1[body_len..].copy_from_slice(INFO);
        }

        // Step 2: mask with KDF(r)
        let r = self.state.random_bytes(Self::digest_len());
        KdfStream::<X>::init(&r).apply_keystream(&mut c1);

        // Step 3: c2 = H(c1) xor r
        let mut c2 = hash::<H>(&[c1.as_slice()]);
        for (a, b) in c2.iter_mut().zip(r.iter()) {
            *a ^= b;
        }

        // Step 4: c2 || c1 = c6 || c5 || c4
        let mut joined = Zeroizing::new(Vec::with_capacity(c2.len() + c1.len()));
        joined.extend_from_slice(&c2);
        joined.extend_from_slice(&c1);
        let c6_len = self.c6_len(input.len());
        let (c6, rest) = joined.split_at(c6_len);
        let (c5, c4) = rest.split_at(self.c5_len);

        // Step 5: primitive encryption
        let c4 = Zeroizing::new(BitVector::from_prefix_bytes(params.k(), c4)?);
        let z = Zeroizing::new(cw::encode(params.n(), params.t(), c5)?);
        let enc = McEliecePke::encrypt(pk, &c4, &z)?;

        // Step 6: c6 || enc
        let mut out = Vec::with_capacity(c6_len + enc.as_bytes().len());
        out.extend_from_slice(c6);
        out.extend_from_slice(enc.as_bytes());
        Ok(out)
    }

    fn decrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let sk = self.state.private_key()?;
        let params = *sk.params();
        let enc_len = primitive_len(&params, input.len())?;
        if input.len() < self.ciphertext_len(0) {
            log::trace!("ciphertext rejected");
            return Err(Error::BadCiphertext);
        }
        let (c6, enc) = input.split_at(input.len() - enc_len);

        // Step 1: (c4, z) from the primitive
        let (c4_full, z, mut valid) = open_primitive(sk, enc)?;
        let (c4, c4_rest) = c4_full.as_bytes().split_at(self.c4_len);
        let rest_or = c4_rest.iter().fold(0u8, |acc, b| acc | b);
        valid &= rest_or.ct_eq(&0);

        // Step 2: c5 from the error vector, fixed width
        let (c5, fits) = rank_bytes(params.n(), params.t(), &z, self.c5_len);
        valid &= fits;

        // Step 3: c6 || c5 || c4 = c2 || c1
        let mut joined = Zeroizing::new(Vec::with_capacity(c6.len() + c5.len() + c4.len()));
        joined.extend_from_slice(c6);
        joined.extend_from_slice(&c5);
        joined.extend_from_slice(c4);
        let (c2, c1) = joined.split_at(Self::digest_len());

        // Step 4: r = H(c1) xor c2
        let mut r = hash::<H>(&[c1]);
        for (a, b) in r.iter_mut().zip(c2) {
            *a ^= b;
        }

        // Step 5: mConst = KDF(r) xor c1
        let mut m_const = Zeroizing::new(c1.to_vec());
        KdfStream::<X>::init(&r).apply_keystream(&mut m_const);

        // Step 6: check the trailing constant, strip the fill if it was marked
        let (body, info) = m_const.split_at(m_const.len() - INFO.len());
        let may_fill = Choice::from(u8::from(c6.is_empty() && self.fill > 0));
        let filled = info.ct_eq(&FILL_INFO) & may_fill;
        let (fill_pos, terminated) = unpad(body);
        valid &= info.ct_eq(INFO) | (filled & terminated);

        let mut m_len = body.len() as u64;
        m_len.conditional_assign(&(fill_pos as u64), filled);
        let m = Zeroizing::new(body[..m_len as usize].to_vec());
        finish(valid, m)
    }
}

/// Rank of `z` as exactly `len` big-endian bytes.
///
/// Returns zeros and a false choice if `z` is not a weight-`t` vector or its
/// rank does not fit.
fn rank_bytes(n: usize, t: usize, z: &BitVector, len: usize) -> (Zeroizing<Vec<u8>>, Choice) {
    let mut out = Zeroizing::new(alloc::vec![0u8; len]);
    let Ok(rank) = cw::rank(n, t, z) else {
        return (out, Choice::from(0));
    };
    if rank.bits() > 8 * len as u64 {
        return (out, Choice::from(0));
    }
    if !rank.is_zero() {
        let be = Zeroizing::new(rank.to_bytes_be());
        out[len - be.len()..].copy_from_slice(&be);
    }
    (out, Choice::from(1))
}

/// Position of the `0x80` terminator: the last non-zero byte of `padded`.
///
/// Scans the whole buffer. The choice is false if the last non-zero byte is
/// not the terminator or there is none.
fn unpad(padded: &[u8]) -> (usize, Choice) {
    let mut found = Choice::from(0);
    let mut ok = Choice::from(0);
    let mut pos = 0u64;
    for (i, b) in padded.iter().enumerate().rev() {
        let nonzero = !b.ct_eq(&0);
        let first = nonzero & !found;
        ok |= first & b.ct_eq(&TERMINATOR);
        pos.conditional_assign(&(i as u64), first);
        found |= nonzero;
    }
    (pos as usize, ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rm::ReedMuller25;
    use crate::test_util::{ShortHamming, TestRng, test_keypair, test_rng};

    extern crate std;
    use std::vec;

    type ToyKobaraImai<'k> = KobaraImaiCipher<'k, ReedMuller25, TestRng>;

    #[test]
    fn roundtrip_ab() {
        let (pk, sk) = test_keypair();
        let mut enc = ToyKobaraImai::new(Key::Public(&pk), test_rng(61)).unwrap();
        let mut dec = ToyKobaraImai::new(Key::Private(&sk), test_rng(62)).unwrap();

        let ct = enc.encrypt(b"AB").unwrap();
        assert_eq!(dec.decrypt(&ct).unwrap(), b"AB");
    }

    #[test]
    fn roundtrip_all_lengths() {
        let (pk, sk) = test_keypair();
        let mut enc = ToyKobaraImai::new(Key::Public(&pk), test_rng(63)).unwrap();
        let mut dec = ToyKobaraImai::new(Key::Private(&sk), test_rng(64)).unwrap();

        for len in 0..=enc.max_plaintext() {
            for byte in [0x00, 0x80, 0xff] {
                let msg = vec![byte; len];
                let ct = enc.encrypt(&msg).unwrap();
                assert_eq!(ct.len(), enc.ciphertext_len(len));
                assert_eq!(dec.decrypt(&ct).unwrap(), msg);
            }
        }
    }

    #[test]
    fn ciphertext_layout() {
        let (pk, _) = test_keypair();
        let enc = ToyKobaraImai::new(Key::Public(&pk), test_rng(65)).unwrap();
        // c6 = len + |Info| + |H| - floor(k/8) - floor(s/8) = len + 31 + 32 - 2 - 1
        assert_eq!(enc.ciphertext_len(0), 60 + 4);
        assert_eq!(enc.ciphertext_len(2), 62 + 4);
        assert_eq!(enc.fill, 0);
    }

    #[test]
    fn ab_ciphertext_has_exact_length() {
        let (pk, sk) = test_keypair();
        let mut enc = ToyKobaraImai::new(Key::Public(&pk), test_rng(72)).unwrap();
        let mut dec = ToyKobaraImai::new(Key::Private(&sk), test_rng(73)).unwrap();

        let ct = enc.encrypt(b"AB").unwrap();
        assert_eq!(ct.len(), 2 + 31 + 32 - 2 - 1 + 4);
        assert_eq!(dec.decrypt(&ct).unwrap(), b"AB");
    }

    type WideKobaraImai<'k> = KobaraImaiCipher<'k, ShortHamming, TestRng>;

    #[test]
    fn fill_length_of_a_wide_code() {
        let (pk, _) = ShortHamming::keypair();
        let enc = WideKobaraImai::new(Key::Public(&pk), test_rng(74)).unwrap();
        // c4 = 64, c5 = floor(log2 522) / 8 = 1, fill = 64 + 1 - 32 - 31
        assert_eq!(enc.c4_len, 64);
        assert_eq!(enc.c5_len, 1);
        assert_eq!(enc.fill, 2);
        assert_eq!(enc.max_plaintext(), 64);

        assert_eq!(enc.ciphertext_len(0), 66);
        assert_eq!(enc.ciphertext_len(1), 66);
        assert_eq!(enc.ciphertext_len(2), 66);
        assert_eq!(enc.ciphertext_len(3), 67);
        assert_eq!(enc.ciphertext_len(64), 128);
    }

    #[test]
    fn roundtrip_around_fill_length() {
        let (pk, sk) = ShortHamming::keypair();
        let mut enc = WideKobaraImai::new(Key::Public(&pk), test_rng(75)).unwrap();
        let mut dec = WideKobaraImai::new(Key::Private(&sk), test_rng(76)).unwrap();

        for len in 0..=enc.max_plaintext() {
            for byte in [0x00, 0x80, 0xff] {
                let msg = vec![byte; len];
                let ct = enc.encrypt(&msg).unwrap();
                assert_eq!(ct.len(), enc.ciphertext_len(len), "length {len}");
                assert_eq!(dec.decrypt(&ct).unwrap(), msg, "length {len}");
            }
        }

        // fill-length plaintexts that look like a filled shorter one
        for msg in [&[0x41, 0x80][..], &[0x80, 0x00][..]] {
            let ct = enc.encrypt(msg).unwrap();
            assert_eq!(dec.decrypt(&ct).unwrap(), msg);
        }
    }

    #[test]
    fn filled_ciphertexts_detect_tampering() {
        let (pk, sk) = ShortHamming::keypair();
        let mut enc = WideKobaraImai::new(Key::Public(&pk), test_rng(77)).unwrap();
        let mut dec = WideKobaraImai::new(Key::Private(&sk), test_rng(78)).unwrap();

        for msg in [&b""[..], &b"K"[..], &b"KI"[..]] {
            let ct = enc.encrypt(msg).unwrap();
            for bit in [0, 7, 80, 100, 300, 521] {
                let mut bad = ct.clone();
                bad[bit / 8] ^= 1 << (bit % 8);
                assert_eq!(dec.decrypt(&bad), Err(Error::BadCiphertext), "bit {bit}");
            }
        }
    }

    #[test]
    fn fill_info_differs_from_info() {
        assert_eq!(FILL_INFO.len(), INFO.len());
        assert!(FILL_INFO.iter().zip(INFO).all(|(a, b)| a ^ b == 0xff));
    }

    #[test]
    fn bit_flips_are_rejected() {
        let (pk, sk) = test_keypair();
        let mut enc = ToyKobaraImai::new(Key::Public(&pk), test_rng(66)).unwrap();
        let mut dec = ToyKobaraImai::new(Key::Private(&sk), test_rng(67)).unwrap();

        let ct = enc.encrypt(b"KI").unwrap();
        let total = ct.len() * 8;
        let mut rejected = 0;
        for bit in 0..total {
            let mut bad = ct.clone();
            bad[bit / 8] ^= 1 << (bit % 8);
            if dec.decrypt(&bad) == Err(Error::BadCiphertext) {
                rejected += 1;
            }
        }
        assert!(rejected + 3 >= total, "{rejected} of {total} flips rejected");
    }

    #[test]
    fn truncated_and_extended_ciphertexts() {
        let (pk, sk) = test_keypair();
        let mut enc = ToyKobaraImai::new(Key::Public(&pk), test_rng(68)).unwrap();
        let mut dec = ToyKobaraImai::new(Key::Private(&sk), test_rng(69)).unwrap();

        let ct = enc.encrypt(b"").unwrap();
        assert_eq!(dec.decrypt(&ct[1..]), Err(Error::BadCiphertext));
        assert_eq!(
            dec.decrypt(&ct[..3]),
            Err(Error::CiphertextTooShort { min: 4, actual: 3 })
        );

        let mut longer = vec![0u8];
        longer.extend_from_slice(&ct);
        assert_eq!(dec.decrypt(&longer), Err(Error::BadCiphertext));
    }

    #[test]
    fn mode_is_enforced() {
        let (pk, sk) = test_keypair();
        let mut enc = ToyKobaraImai::new(Key::Public(&pk), test_rng(70)).unwrap();
        let mut dec = ToyKobaraImai::new(Key::Private(&sk), test_rng(71)).unwrap();
        assert_eq!(enc.decrypt(&[0u8; 70]), Err(Error::WrongMode));
        assert_eq!(dec.encrypt(b"AB"), Err(Error::WrongMode));
    }

    #[test]
    fn unpad_finds_terminator() {
        let (len, ok) = unpad(&[1, 2, 0x80, 0, 0]);
        assert!(bool::from(ok));
        assert_eq!(len, 2);

        let (len, ok) = unpad(&[0x80, 0x80]);
        assert!(bool::from(ok));
        assert_eq!(len, 1);

        assert!(!bool::from(unpad(&[1, 2, 3, 0]).1));
        assert!(!bool::from(unpad(&[0, 0, 0]).1));
        assert!(!bool::from(unpad(&[]).1));
    }

    #[test]
    fn rank_bytes_is_fixed_width() {
        let z = cw::encode(32, 3, &[0x01]).unwrap();
        let (bytes, ok) = rank_bytes(32, 3, &z, 1);
        assert!(bool::from(ok));
        assert_eq!(bytes.as_slice(), &[0x01]);

        let z = cw::encode(32, 3, &[0x01, 0x00]).unwrap();
        let (bytes, ok) = rank_bytes(32, 3, &z, 1);
        assert!(!bool::from(ok));
        assert_eq!(bytes.as_slice(), &[0x00]);

        let (_, ok) = rank_bytes(32, 3, &BitVector::zero(32), 1);
        assert!(!bool::from(ok));
    }
}
