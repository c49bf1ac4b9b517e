//! Operations over [`RsaKeyMaterial`].
//!
//! Every call follows the same path: validate the inputs, build a transient
//! [`RsaPrivateKey`] or [`RsaPublicKey`], run the primitive, and drop the
//! transient key (which wipes it). Private-key operations are always blinded
//! with the `rng` passed to that call.

use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use rand_core::CryptoRngCore;
use sha1::Sha1;

use crate::errors::{Error, Result};
use crate::hash::DigestAlgorithm;
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::material::RsaKeyMaterial;
use crate::oaep::Oaep;
use crate::pkcs1v15::{Pkcs1v15Encrypt, SigningKey, VerifyingKey};
use crate::traits::PublicKeyParts;

/// Longest digest accepted by [`sign`] and [`verify`].
pub const MAX_DIGEST_LEN: usize = 64;

/// Longest signature accepted by [`verify`], matching the largest modulus.
pub const MAX_SIGNATURE_LEN: usize = 3072;

/// Bytes added by PKCS#1 v1.5 encryption padding.
const PKCS1V15_OVERHEAD: usize = 11;

/// Bytes added by OAEP with SHA-1: two 20-byte hashes, the leading zero
/// byte and the 0x01 separator. A `k - 41` bound would admit messages the
/// padding can never hold.
const OAEP_SHA1_OVERHEAD: usize = 42;

/// Encryption padding selectable through the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncryptionScheme {
    /// RSAES-PKCS1-v1_5.
    Pkcs1v15,
    /// RSAES-OAEP with SHA-1, MGF1-SHA-1 and an empty label.
    Oaep,
}

impl EncryptionScheme {
    /// Largest plaintext that fits a modulus of `k` bytes.
    pub fn max_plaintext_len(self, k: usize) -> usize {
        match self {
            EncryptionScheme::Pkcs1v15 => k.saturating_sub(PKCS1V15_OVERHEAD),
            EncryptionScheme::Oaep => k.saturating_sub(OAEP_SHA1_OVERHEAD),
        }
    }

    fn name(self) -> &'static str {
        match self {
            EncryptionScheme::Pkcs1v15 => "pkcs1v1.5",
            EncryptionScheme::Oaep => "oaep",
        }
    }
}

impl fmt::Display for EncryptionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EncryptionScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pkcs1v1.5" => Ok(EncryptionScheme::Pkcs1v15),
            "oaep" => Ok(EncryptionScheme::Oaep),
            _ => Err(Error::UnsupportedAlgorithm),
        }
    }
}

impl TryFrom<u8> for EncryptionScheme {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        match id {
            0 => Ok(EncryptionScheme::Pkcs1v15),
            1 => Ok(EncryptionScheme::Oaep),
            _ => Err(Error::UnsupportedAlgorithm),
        }
    }
}

/// Logs why an input was refused and hands back the error.
#[inline]
fn reject(reason: &str, err: Error) -> Error {
    #[cfg(feature = "log")]
    log::debug!("rejected: {}", reason);
    #[cfg(not(feature = "log"))]
    let _ = reason;
    err
}

pub(crate) fn check_digest_len(digest: &[u8]) -> Result<()> {
    if digest.is_empty() || digest.len() > MAX_DIGEST_LEN {
        return Err(reject("digest length out of range", Error::InvalidMessageLength));
    }
    Ok(())
}

fn private_key(key: &RsaKeyMaterial) -> Result<RsaPrivateKey> {
    RsaPrivateKey::try_from(key)
        .map_err(|err| reject("private key fails structural checks", err))
}

fn public_key(key: &RsaKeyMaterial) -> Result<RsaPublicKey> {
    RsaPublicKey::try_from(key).map_err(|err| reject("public key fails structural checks", err))
}

/// Signs a precomputed `digest` with RSASSA-PKCS1-v1_5.
///
/// `alg` names the digest algorithm whose `DigestInfo` prefix is embedded;
/// the digest length is not required to match it.
pub fn sign<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    alg: &str,
    digest: &[u8],
    key: &RsaKeyMaterial,
) -> Result<Vec<u8>> {
    let alg = DigestAlgorithm::from_str(alg)
        .map_err(|err| reject("unknown digest algorithm", err))?;
    check_digest_len(digest)?;

    let key = SigningKey::new(private_key(key)?, alg);
    Ok(key.sign_digest(rng, digest)?.into())
}

/// Checks an RSASSA-PKCS1-v1_5 signature over a precomputed `digest`.
///
/// Returns `false` for any failure, including malformed inputs.
pub fn verify(alg: &str, digest: &[u8], sig: &[u8], key: &RsaKeyMaterial) -> bool {
    try_verify(alg, digest, sig, key).is_ok()
}

fn try_verify(alg: &str, digest: &[u8], sig: &[u8], key: &RsaKeyMaterial) -> Result<()> {
    let alg = DigestAlgorithm::from_str(alg)
        .map_err(|err| reject("unknown digest algorithm", err))?;
    check_digest_len(digest)?;

    if sig.is_empty() || sig.len() > MAX_SIGNATURE_LEN {
        return Err(reject("signature length out of range", Error::Verification));
    }

    let key = public_key(key)?;
    if sig.len() != key.size() {
        return Err(reject("signature length differs from modulus", Error::Verification));
    }

    VerifyingKey::new(key, alg).verify_digest(digest, sig)
}

/// Encrypts `msg` for the public half of `key`.
///
/// The ciphertext is always as long as the modulus.
pub fn encrypt<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    scheme: EncryptionScheme,
    msg: &[u8],
    key: &RsaKeyMaterial,
) -> Result<Vec<u8>> {
    if msg.is_empty() {
        return Err(reject("empty plaintext", Error::InvalidMessageLength));
    }

    let key = public_key(key)?;
    if msg.len() > scheme.max_plaintext_len(key.size()) {
        return Err(reject("plaintext too long", Error::PlaintextTooLong));
    }

    match scheme {
        EncryptionScheme::Pkcs1v15 => key.encrypt(rng, Pkcs1v15Encrypt, msg),
        EncryptionScheme::Oaep => key.encrypt(rng, Oaep::new::<Sha1>(), msg),
    }
}

/// Decrypts `ciphertext` with the private key `key`.
pub fn decrypt<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    scheme: EncryptionScheme,
    ciphertext: &[u8],
    key: &RsaKeyMaterial,
) -> Result<Vec<u8>> {
    let key = private_key(key)?;
    if ciphertext.is_empty() || ciphertext.len() > key.size() {
        return Err(reject("ciphertext length out of range", Error::InvalidMessageLength));
    }

    match scheme {
        EncryptionScheme::Pkcs1v15 => key.decrypt_blinded(rng, Pkcs1v15Encrypt, ciphertext),
        EncryptionScheme::Oaep => key.decrypt_blinded(rng, Oaep::new::<Sha1>(), ciphertext),
    }
}

/// Generates a fresh two-prime key of `bits` bits with public exponent `exp`.
pub fn generate<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    bits: usize,
    exp: u64,
) -> Result<RsaKeyMaterial> {
    let key = RsaPrivateKey::new_with_exp(rng, bits, exp)
        .map_err(|err| reject("unsupported key size or exponent", err))?;
    Ok(RsaKeyMaterial::from(&key))
}
