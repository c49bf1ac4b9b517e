use super::{verify, Signature};
use crate::engine::check_digest_len;
use crate::{DigestAlgorithm, Result, RsaKeyMaterial, RsaPublicKey};
use alloc::vec::Vec;
use pkcs8::{Document, EncodePublicKey};
use signature::hazmat::PrehashVerifier;

/// A public key bound to the digest algorithm expected in the `DigestInfo`
/// of `RSASSA-PKCS1-v1_5` signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyingKey {
    inner: RsaPublicKey,
    algorithm: DigestAlgorithm,
    prefix: Vec<u8>,
}

impl VerifyingKey {
    /// Binds `key` to `algorithm`.
    pub fn new(key: RsaPublicKey, algorithm: DigestAlgorithm) -> Self {
        Self {
            inner: key,
            algorithm,
            prefix: algorithm.prefix(),
        }
    }

    /// Builds a verifying key from the public half of `material`.
    pub fn from_material(material: &RsaKeyMaterial, algorithm: DigestAlgorithm) -> Result<Self> {
        Ok(Self::new(RsaPublicKey::try_from(material)?, algorithm))
    }

    /// The digest algorithm a signature must name.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Exports the public key as material.
    pub fn to_material(&self) -> RsaKeyMaterial {
        RsaKeyMaterial::from(&self.inner)
    }

    /// Checks `sig` over a precomputed digest.
    pub fn verify_digest(&self, digest: &[u8], sig: &[u8]) -> Result<()> {
        check_digest_len(digest)?;
        verify(&self.inner, &self.prefix, digest, sig)
    }
}

impl PrehashVerifier<Signature> for VerifyingKey {
    fn verify_prehash(&self, prehash: &[u8], signature: &Signature) -> signature::Result<()> {
        Ok(self.verify_digest(prehash, signature.as_ref())?)
    }
}

impl AsRef<RsaPublicKey> for VerifyingKey {
    fn as_ref(&self) -> &RsaPublicKey {
        &self.inner
    }
}

impl From<VerifyingKey> for RsaPublicKey {
    fn from(key: VerifyingKey) -> Self {
        key.inner
    }
}

impl EncodePublicKey for VerifyingKey {
    fn to_public_key_der(&self) -> pkcs8::spki::Result<Document> {
        self.inner.to_public_key_der()
    }
}
