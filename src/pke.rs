//! McEliece trapdoor primitive.
//!
//! `encrypt(pk, m, z) = m * G' + z` where `G' = S * G * P` is the public
//! generator. The private key holds the permutation `P` and the code trapdoor.
//! Decryption strips the permutation, corrects the error through the syndrome
//! decoder and reads the message off the systematic part of the codeword.

use core::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Error, Result};
use crate::param::{CodeFamily, CodeParams};
use crate::vect::{BitVector, Permutation};

/// Public key: code parameters and the public generator matrix.
pub struct PublicKey<C: CodeFamily> {
    params: CodeParams,
    generator: C::Generator,
}

impl<C: CodeFamily> PublicKey<C> {
    /// Wraps a public generator for the given parameters.
    pub fn new(params: CodeParams, generator: C::Generator) -> Self {
        Self { params, generator }
    }

    /// Code parameters.
    pub fn params(&self) -> &CodeParams {
        &self.params
    }

    /// Public generator matrix.
    pub fn generator(&self) -> &C::Generator {
        &self.generator
    }
}

impl<C: CodeFamily> Clone for PublicKey<C>
where
    C::Generator: Clone,
{
    fn clone(&self) -> Self {
        Self {
            params: self.params,
            generator: self.generator.clone(),
        }
    }
}

impl<C: CodeFamily> fmt::Debug for PublicKey<C>
where
    C::Generator: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("params", &self.params)
            .field("generator", &self.generator)
            .finish()
    }
}

/// Private key: code parameters, the secret permutation and the decoder.
///
/// Zeroized on drop.
pub struct PrivateKey<C: CodeFamily> {
    params: CodeParams,
    permutation: Permutation,
    trapdoor: C::Trapdoor,
}

impl<C: CodeFamily> PrivateKey<C> {
    /// Assembles a private key.
    ///
    /// # Errors
    /// [`Error::InvalidParameters`] if the permutation does not act on `n`
    /// coordinates.
    pub fn new(params: CodeParams, permutation: Permutation, trapdoor: C::Trapdoor) -> Result<Self> {
        if permutation.len() != params.n() {
            return Err(Error::InvalidParameters("permutation length differs from n"));
        }
        Ok(Self {
            params,
            permutation,
            trapdoor,
        })
    }

    /// Code parameters.
    pub fn params(&self) -> &CodeParams {
        &self.params
    }

    /// Secret coordinate permutation.
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }
}

impl<C: CodeFamily> Drop for PrivateKey<C> {
    fn drop(&mut self) {
        self.permutation.zeroize();
        self.trapdoor.zeroize();
    }
}

impl<C: CodeFamily> ZeroizeOnDrop for PrivateKey<C> {}

impl<C: CodeFamily> fmt::Debug for PrivateKey<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// The raw McEliece primitive.
pub struct McEliecePke;

impl McEliecePke {
    /// Encrypt: `c = m * G + z`.
    ///
    /// No weight restriction is put on `z`; only errors of weight at most `t`
    /// decrypt.
    ///
    /// # Errors
    /// [`Error::Argument`] if `m` is not `k` bits or `z` is not `n` bits.
    pub fn encrypt<C: CodeFamily>(
        pk: &PublicKey<C>,
        m: &BitVector,
        z: &BitVector,
    ) -> Result<BitVector> {
        if m.len() != pk.params.k() {
            return Err(Error::Argument("message length differs from k"));
        }
        if z.len() != pk.params.n() {
            return Err(Error::Argument("error vector length differs from n"));
        }
        let mut c = C::left_multiply(&pk.generator, m);
        c.xor_assign(z)?;
        Ok(c)
    }

    /// Decrypt: recover `(m, z)` from `c = m * G + z`.
    ///
    /// # Algorithm
    /// 1. `c' = P^-1(c)`
    /// 2. `s = H * c'`
    /// 3. `e = SyndromeDecode(s)`
    /// 4. `w = c' + e`
    /// 5. `w <- P(w)`, `e <- P(e)`
    /// 6. `m` = last `k` bits of `w`
    ///
    /// # Errors
    /// [`Error::Argument`] if `c` is not `n` bits, [`Error::Decoding`] if the
    /// error cannot be corrected.
    pub fn decrypt<C: CodeFamily>(
        sk: &PrivateKey<C>,
        c: &BitVector,
    ) -> Result<(BitVector, BitVector)> {
        if c.len() != sk.params.n() {
            return Err(Error::Argument("ciphertext length differs from n"));
        }

        // Step 1: undo the permutation
        let p_inv = Zeroizing::new(sk.permutation.inverse());
        let c_prime = Zeroizing::new(p_inv.apply(c)?);

        // Step 2: syndrome
        let syndrome = Zeroizing::new(C::syndrome(&sk.trapdoor, &c_prime));

        // Step 3: decode
        let e = Zeroizing::new(C::syndrome_decode(&sk.trapdoor, &syndrome)?);

        // Step 4: corrected codeword
        let w = Zeroizing::new(c_prime.xor(&e)?);

        // Step 5: back to public coordinates
        let w = Zeroizing::new(sk.permutation.apply(&w)?);
        let e = sk.permutation.apply(&e)?;

        // Step 6: systematic part
        let m = w.right_bits(sk.params.k())?;
        Ok((m, e))
    }
}
