#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//!
//! # Modules
//!
//! - [`cw`]: constant-weight codec between integers and weight-`t` vectors
//! - [`McEliecePke`]: the trapdoor primitive, generic over a [`CodeFamily`]
//! - [`FujisakiCipher`], [`KobaraImaiCipher`], [`PointchevalCipher`]: the
//!   conversions, all implementing [`Cca2Cipher`]
//! - [`rm`]: the RM(2,5) reference code
//!
//! With the default `getrandom` feature, [`OsRng`] is re-exported as a ready
//! random source for the conversions.

extern crate alloc;

#[cfg(test)]
mod test_util;

/// Hash and KDF stream.
mod xof;

/// Bit vectors and permutations.
mod vect;

pub mod cw;

mod error;

/// Code parameters and the code-algebra trait.
mod param;

/// McEliece primitive.
mod pke;

mod cca2;

mod fujisaki;

mod kobara_imai;

mod pointcheval;

pub mod rm;

pub use cca2::{Cca2Cipher, Key};
pub use error::{Error, Result};
pub use fujisaki::FujisakiCipher;
pub use kobara_imai::{INFO as KOBARA_IMAI_INFO, KobaraImaiCipher};
pub use param::{CodeFamily, CodeParams};
pub use pke::{McEliecePke, PrivateKey, PublicKey};
pub use pointcheval::PointchevalCipher;
pub use vect::{BitVector, Permutation, padding_is_clear};
pub use xof::KdfStream;

#[cfg(feature = "getrandom")]
pub use rand_core::OsRng;
