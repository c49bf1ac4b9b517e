//! ⚠️ Low-level "hazmat" RSA functions.
//!
//! # ☢️️ WARNING: HAZARDOUS API ☢️
//!
//! These are the bare RSA primitives the padding schemes and the
//! [`engine`][crate::engine] build on: modular exponentiation with the public
//! exponent, and the CRT private-key operation with optional blinding. No
//! padding is added or removed. Raw RSA without a reviewed padding scheme is
//! not secure.
//!
//! [`rsa_decrypt_and_check`] re-encrypts its result and fails with
//! [`Error::PrimitiveFailure`][crate::Error::PrimitiveFailure] when the CRT
//! computation was faulty. Prefer it over [`rsa_decrypt`].

pub use crate::algorithms::rsa::{rsa_decrypt, rsa_decrypt_and_check, rsa_encrypt};
