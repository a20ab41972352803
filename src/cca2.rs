//! Shared machinery of the CCA2 conversions.
//!
//! A conversion is initialized once with a [`Key`]: a public key gives an
//! encryption-only instance, a private key a decryption-only instance.
//! Decryption never reports which check failed. Every internal failure is
//! folded into a [`Choice`] and surfaces as [`Error::BadCiphertext`] after all
//! steps have run on placeholder values.

use alloc::vec::Vec;
use core::mem;

use rand_core::{CryptoRng, RngCore};
use sha3::digest::Digest;
use subtle::Choice;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::param::{CodeFamily, CodeParams};
use crate::pke::{McEliecePke, PrivateKey, PublicKey};
use crate::vect::{BitVector, padding_is_clear};

/// Key a conversion is initialized with; selects the mode.
pub enum Key<'k, C: CodeFamily> {
    /// Encryption mode.
    Public(&'k PublicKey<C>),
    /// Decryption mode.
    Private(&'k PrivateKey<C>),
}

impl<C: CodeFamily> Clone for Key<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: CodeFamily> Copy for Key<'_, C> {}

impl<C: CodeFamily> Key<'_, C> {
    /// Code parameters of the underlying key.
    pub fn params(&self) -> &CodeParams {
        match self {
            Key::Public(pk) => pk.params(),
            Key::Private(sk) => sk.params(),
        }
    }
}

/// A CCA2-secure public-key encryption scheme over the McEliece primitive.
pub trait Cca2Cipher {
    /// Object identifier of the conversion.
    const OID: &'static str;

    /// Largest plaintext accepted by [`encrypt`](Self::encrypt), in bytes.
    fn max_plaintext(&self) -> usize;

    /// Length of the ciphertext of a `plaintext_len`-byte message.
    fn ciphertext_len(&self, plaintext_len: usize) -> usize;

    /// Encrypts `input` with fresh randomness.
    ///
    /// # Errors
    /// [`Error::WrongMode`] without a public key, [`Error::PlaintextTooLong`]
    /// past [`max_plaintext`](Self::max_plaintext).
    fn encrypt(&mut self, input: &[u8]) -> Result<Vec<u8>>;

    /// Decrypts and authenticates `input`.
    ///
    /// # Errors
    /// [`Error::WrongMode`] without a private key, [`Error::CiphertextTooShort`]
    /// if `input` cannot hold a primitive ciphertext, [`Error::BadCiphertext`]
    /// for anything that fails to authenticate.
    fn decrypt(&mut self, input: &[u8]) -> Result<Vec<u8>>;
}

/// Mode, randomness and limits common to every conversion.
pub(crate) struct SchemeState<'k, C: CodeFamily, R> {
    key: Key<'k, C>,
    rng: R,
    max_plaintext: usize,
}

impl<'k, C: CodeFamily, R: RngCore + CryptoRng> SchemeState<'k, C, R> {
    pub(crate) fn new(key: Key<'k, C>, rng: R, scheme: &'static str) -> Self {
        let params = *key.params();
        let max_plaintext = params.k() / 8;
        log::debug!(
            "{scheme}: n={} k={} t={}, {} mode, max plaintext {max_plaintext} bytes",
            params.n(),
            params.k(),
            params.t(),
            match key {
                Key::Public(_) => "encrypt",
                Key::Private(_) => "decrypt",
            },
        );
        Self {
            key,
            rng,
            max_plaintext,
        }
    }

    pub(crate) fn params(&self) -> CodeParams {
        *self.key.params()
    }

    pub(crate) fn max_plaintext(&self) -> usize {
        self.max_plaintext
    }

    pub(crate) fn public_key(&self) -> Result<&'k PublicKey<C>> {
        match self.key {
            Key::Public(pk) => Ok(pk),
            Key::Private(_) => Err(Error::WrongMode),
        }
    }

    pub(crate) fn private_key(&self) -> Result<&'k PrivateKey<C>> {
        match self.key {
            Key::Private(sk) => Ok(sk),
            Key::Public(_) => Err(Error::WrongMode),
        }
    }

    pub(crate) fn check_plaintext(&self, len: usize) -> Result<()> {
        if len > self.max_plaintext {
            return Err(Error::PlaintextTooLong {
                max: self.max_plaintext,
                actual: len,
            });
        }
        Ok(())
    }

    /// Uniform `bits`-bit vector; its byte encoding seeds the KDF.
    pub(crate) fn random_vector(&mut self, bits: usize) -> Zeroizing<BitVector> {
        Zeroizing::new(BitVector::random(bits, &mut self.rng))
    }

    pub(crate) fn random_bytes(&mut self, len: usize) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(alloc::vec![0u8; len]);
        self.rng.fill_bytes(&mut out);
        out
    }
}

/// Rejects digests whose output may not fall below `C(n, t)`.
pub(crate) fn check_digest_width<H: Digest>(params: &CodeParams) -> Result<()> {
    if 8 * <H as Digest>::output_size() > params.error_space_bits() {
        return Err(Error::UnsupportedDigest);
    }
    Ok(())
}

/// Length of the primitive ciphertext, checking that `input_len` can hold one.
pub(crate) fn primitive_len(params: &CodeParams, input_len: usize) -> Result<usize> {
    let c1_len = params.ciphertext_bytes();
    if input_len < c1_len {
        return Err(Error::CiphertextTooShort {
            min: c1_len,
            actual: input_len,
        });
    }
    Ok(c1_len)
}

/// Inverts the primitive on `c1` (exactly `ceil(n / 8)` bytes).
///
/// On failure the message and error are zero placeholders and the returned
/// [`Choice`] is false. Non-canonical padding bits also clear the choice.
pub(crate) fn open_primitive<C: CodeFamily>(
    sk: &PrivateKey<C>,
    c1: &[u8],
) -> Result<(Zeroizing<BitVector>, Zeroizing<BitVector>, Choice)> {
    let params = sk.params();
    let canonical = padding_is_clear(params.n(), c1);
    let c = BitVector::from_bytes(params.n(), c1)?;
    Ok(match McEliecePke::decrypt(sk, &c) {
        Ok((m, e)) => (Zeroizing::new(m), Zeroizing::new(e), canonical),
        Err(_) => (
            Zeroizing::new(BitVector::zero(params.k())),
            Zeroizing::new(BitVector::zero(params.n())),
            Choice::from(0),
        ),
    })
}

/// Releases the recovered plaintext if every check passed.
pub(crate) fn finish(valid: Choice, mut plaintext: Zeroizing<Vec<u8>>) -> Result<Vec<u8>> {
    if bool::from(valid) {
        Ok(mem::take(&mut *plaintext))
    } else {
        log::trace!("ciphertext rejected");
        Err(Error::BadCiphertext)
    }
}
