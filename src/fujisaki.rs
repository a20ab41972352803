//! Fujisaki–Okamoto conversion.
//!
//! Encrypt(m):
//! 1. draw a random `k`-bit vector `r`
//! 2. `z = Encode(n, t, H(r || m))`
//! 3. `c1 = McEliece.Encrypt(pk, r, z)`
//! 4. `c2 = KDF(r) xor m`
//! 5. output `c1 || c2`
//!
//! Decryption recovers `(r, z)` from `c1`, unmasks `m` and accepts only if
//! re-encoding `H(r || m)` yields `z` again.

use alloc::vec::Vec;
use core::marker::PhantomData;

use rand_core::{CryptoRng, RngCore};
use sha3::digest::{Digest, ExtendableOutput, Update};
use sha3::{Sha3_256, Shake256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::cca2::{
    Cca2Cipher, Key, SchemeState, check_digest_width, finish, open_primitive, primitive_len,
};
use crate::cw;
use crate::error::Result;
use crate::param::CodeFamily;
use crate::pke::McEliecePke;
use crate::xof::{KdfStream, hash};

/// Fujisaki–Okamoto CCA2 conversion of the McEliece primitive.
///
/// `H` must fit into the error space: initialization fails with
/// [`Error::UnsupportedDigest`](crate::Error::UnsupportedDigest) if its
/// output is wider than `floor(log2 C(n, t))` bits.
pub struct FujisakiCipher<'k, C: CodeFamily, R, H = Sha3_256, X = Shake256> {
    state: SchemeState<'k, C, R>,
    _hash: PhantomData<fn() -> (H, X)>,
}

impl<'k, C, R, H, X> FujisakiCipher<'k, C, R, H, X>
where
    C: CodeFamily,
    R: RngCore + CryptoRng,
    H: Digest,
    X: Default + Update + ExtendableOutput,
{
    /// Initializes the conversion; the key decides between encryption and
    /// decryption.
    pub fn new(key: Key<'k, C>, rng: R) -> Result<Self> {
        check_digest_width::<H>(key.params())?;
        Ok(Self {
            state: SchemeState::new(key, rng, "Fujisaki-Okamoto"),
            _hash: PhantomData,
        })
    }
}

impl<C, R, H, X> Cca2Cipher for FujisakiCipher<'_, C, R, H, X>
where
    C: CodeFamily,
    R: RngCore + CryptoRng,
    H: Digest,
    X: Default + Update + ExtendableOutput,
{
    const OID: &'static str = "1.3.6.1.4.1.8301.3.1.3.4.2.1";

    fn max_plaintext(&self) -> usize {
        self.state.max_plaintext()
    }

    fn ciphertext_len(&self, plaintext_len: usize) -> usize {
        self.state.params().ciphertext_bytes() + plaintext_len
    }

    fn encrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let pk = self.state.public_key()?;
        self.state.check_plaintext(input.len())?;
        let params = *pk.params();

        // Step 1: random r
        let r = self.state.random_vector(params.k());

        // Step 2: error vector from H(r || m)
        let digest = hash::<H>(&[r.as_bytes(), input]);
        let z = Zeroizing::new(cw::encode(params.n(), params.t(), &digest)?);

        // Step 3: primitive ciphertext
        let c1 = McEliecePke::encrypt(pk, &r, &z)?;

        // Step 4 & 5: c1 || KDF(r) xor m
        let mut out = Vec::with_capacity(self.ciphertext_len(input.len()));
        out.extend_from_slice(c1.as_bytes());
        out.extend_from_slice(input);
        KdfStream::<X>::init(r.as_bytes()).apply_keystream(&mut out[c1.as_bytes().len()..]);
        Ok(out)
    }

    fn decrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let sk = self.state.private_key()?;
        let params = *sk.params();
        let c1_len = primitive_len(&params, input.len())?;
        let (c1, c2) = input.split_at(c1_len);

        // Step 1: (r, z) from the primitive
        let (r, z, mut valid) = open_primitive(sk, c1)?;

        // Step 2: unmask m
        let mut m = Zeroizing::new(c2.to_vec());
        KdfStream::<X>::init(r.as_bytes()).apply_keystream(&mut m);

        // Step 3: recompute the error vector and compare
        let digest = hash::<H>(&[r.as_bytes(), m.as_slice()]);
        let z_prime = Zeroizing::new(cw::encode(params.n(), params.t(), &digest)?);
        valid &= z_prime.ct_eq(&z);

        finish(valid, m)
    }
}
