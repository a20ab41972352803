//! Pointcheval conversion.
//!
//! Encrypt(m):
//! 1. draw `r` (`floor(k / 8)` random bytes) and a random `k`-bit vector `r'`
//! 2. `z = Encode(n, t, H(m || r))`
//! 3. `c1 = McEliece.Encrypt(pk, r', z)`
//! 4. `c2 = KDF(r') xor (m || r)`
//! 5. output `c1 || c2`

use alloc::vec::Vec;
use core::marker::PhantomData;

use rand_core::{CryptoRng, RngCore};
use sha3::digest::{Digest, ExtendableOutput, Update};
use sha3::{Sha3_256, Shake256};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::cca2::{
    Cca2Cipher, Key, SchemeState, check_digest_width, finish, open_primitive, primitive_len,
};
use crate::cw;
use crate::error::{Error, Result};
use crate::param::CodeFamily;
use crate::pke::McEliecePke;
use crate::xof::{KdfStream, hash};

/// Pointcheval CCA2 conversion of the McEliece primitive.
pub struct PointchevalCipher<'k, C: CodeFamily, R, H = Sha3_256, X = Shake256> {
    state: SchemeState<'k, C, R>,
    _hash: PhantomData<fn() -> (H, X)>,
}

impl<'k, C, R, H, X> PointchevalCipher<'k, C, R, H, X>
where
    C: CodeFamily,
    R: RngCore + CryptoRng,
    H: Digest,
    X: Default + Update + ExtendableOutput,
{
    /// Initializes the conversion for the mode selected by `key`.
    ///
    /// # Errors
    /// [`Error::UnsupportedDigest`] if `H` is wider than the error space.
    pub fn new(key: Key<'k, C>, rng: R) -> Result<Self> {
        check_digest_width::<H>(key.params())?;
        Ok(Self {
            state: SchemeState::new(key, rng, "Pointcheval"),
            _hash: PhantomData,
        })
    }

    fn salt_len(&self) -> usize {
        self.state.params().k() / 8
    }
}

impl<C, R, H, X> Cca2Cipher for PointchevalCipher<'_, C, R, H, X>
where
    C: CodeFamily,
    R: RngCore + CryptoRng,
    H: Digest,
    X: Default + Update + ExtendableOutput,
{
    const OID: &'static str = "1.3.6.1.4.1.8301.3.1.3.4.2.2";

    fn max_plaintext(&self) -> usize {
        self.state.max_plaintext()
    }

    fn ciphertext_len(&self, plaintext_len: usize) -> usize {
        self.state.params().ciphertext_bytes() + plaintext_len + self.salt_len()
    }

    fn encrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let pk = self.state.public_key()?;
        self.state.check_plaintext(input.len())?;
        let params = *pk.params();

        // Step 1: r and r'
        let salt_len = self.salt_len();
        let r = self.state.random_bytes(salt_len);
        let r_prime = self.state.random_vector(params.k());

        // Step 2: error vector from H(m || r)
        let mut body = Zeroizing::new(Vec::with_capacity(input.len() + r.len()));
        body.extend_from_slice(input);
        body.extend_from_slice(&r);
        let digest = hash::<H>(&[body.as_slice()]);
        let z = Zeroizing::new(cw::encode(params.n(), params.t(), &digest)?);

        // Step 3: primitive ciphertext
        let c1 = McEliecePke::encrypt(pk, &r_prime, &z)?;

        // Step 4 & 5: c1 || KDF(r') xor (m || r)
        KdfStream::<X>::init(r_prime.as_bytes()).apply_keystream(&mut body);
        let mut out = Vec::with_capacity(self.ciphertext_len(input.len()));
        out.extend_from_slice(c1.as_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    fn decrypt(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let sk = self.state.private_key()?;
        let params = *sk.params();
        let c1_len = primitive_len(&params, input.len())?;
        let (c1, c2) = input.split_at(c1_len);
        let salt_len = self.salt_len();
        if c2.len() < salt_len {
            log::trace!("ciphertext rejected");
            return Err(Error::BadCiphertext);
        }

        // Step 1: (r', z) from the primitive
        let (r_prime, z, mut valid) = open_primitive(sk, c1)?;

        // Step 2: unmask m || r
        let mut body = Zeroizing::new(c2.to_vec());
        KdfStream::<X>::init(r_prime.as_bytes()).apply_keystream(&mut body);

        // Step 3: recompute the error vector and compare
        let digest = hash::<H>(&[body.as_slice()]);
        let z_prime = Zeroizing::new(cw::encode(params.n(), params.t(), &digest)?);
        valid &= z_prime.ct_eq(&z);

        // Step 4: strip r
        let m_len = body.len() - salt_len;
        body[m_len..].zeroize();
        body.truncate(m_len);

        finish(valid, body)
    }
}
