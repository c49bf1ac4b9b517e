use super::{sign, Signature, VerifyingKey};
use crate::engine::check_digest_len;
use crate::{DigestAlgorithm, Result, RsaKeyMaterial, RsaPrivateKey};
use alloc::vec::Vec;
use pkcs8::{EncodePrivateKey, SecretDocument};
use rand_core::CryptoRngCore;
use signature::{hazmat::RandomizedPrehashSigner, Keypair};
use zeroize::ZeroizeOnDrop;

/// A private key bound to the digest algorithm whose `DigestInfo` prefix it
/// embeds in `RSASSA-PKCS1-v1_5` signatures.
///
/// Messages are hashed by the caller, so only the prehash signer trait is
/// implemented. Every signature is blinded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningKey {
    inner: RsaPrivateKey,
    algorithm: DigestAlgorithm,
    prefix: Vec<u8>,
}

impl SigningKey {
    /// Binds `key` to `algorithm`.
    pub fn new(key: RsaPrivateKey, algorithm: DigestAlgorithm) -> Self {
        Self {
            inner: key,
            algorithm,
            prefix: algorithm.prefix(),
        }
    }

    /// Builds a signing key from private key material.
    ///
    /// Fails with [`Error::InvalidKeyMaterial`][crate::Error::InvalidKeyMaterial]
    /// unless the material passes the private-key bounds.
    pub fn from_material(material: &RsaKeyMaterial, algorithm: DigestAlgorithm) -> Result<Self> {
        Ok(Self::new(RsaPrivateKey::try_from(material)?, algorithm))
    }

    /// The digest algorithm named in every signature.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Exports the key as material.
    pub fn to_material(&self) -> RsaKeyMaterial {
        RsaKeyMaterial::from(&self.inner)
    }

    /// Signs a precomputed digest of 1 to 64 bytes.
    ///
    /// The digest length is not tied to [`SigningKey::algorithm`].
    pub fn sign_digest<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        digest: &[u8],
    ) -> Result<Signature> {
        check_digest_len(digest)?;
        sign(Some(rng), &self.inner, &self.prefix, digest).map(Signature::new)
    }
}

impl RandomizedPrehashSigner<Signature> for SigningKey {
    fn sign_prehash_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        prehash: &[u8],
    ) -> signature::Result<Signature> {
        Ok(self.sign_digest(rng, prehash)?)
    }
}

impl Keypair for SigningKey {
    type VerifyingKey = VerifyingKey;

    fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey::new(self.inner.to_public_key(), self.algorithm)
    }
}

impl AsRef<RsaPrivateKey> for SigningKey {
    fn as_ref(&self) -> &RsaPrivateKey {
        &self.inner
    }
}

impl EncodePrivateKey for SigningKey {
    fn to_pkcs8_der(&self) -> pkcs8::Result<SecretDocument> {
        self.inner.to_pkcs8_der()
    }
}

impl ZeroizeOnDrop for SigningKey {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine, Error};
    use pkcs8::DecodePrivateKey;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
    use sha2::{Digest, Sha256};
    use signature::hazmat::PrehashVerifier;

    fn material() -> RsaKeyMaterial {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        engine::generate(&mut rng, 512, 65537).unwrap()
    }

    #[test]
    fn test_matches_facade() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let material = material();
        let digest = Sha256::digest(b"hello");

        let signing_key = SigningKey::from_material(&material, DigestAlgorithm::Sha256).unwrap();
        assert_eq!(signing_key.algorithm(), DigestAlgorithm::Sha256);
        assert_eq!(signing_key.to_material(), material);

        let sig = signing_key.sign_prehash_with_rng(&mut rng, &digest).unwrap();
        assert_eq!(
            Vec::from(sig.clone()),
            engine::sign(&mut rng, "sha256", &digest, &material).unwrap()
        );
        assert!(signing_key.verifying_key().verify_prehash(&digest, &sig).is_ok());
    }

    #[test]
    fn test_rejects_public_material() {
        let material = material().to_public();
        assert_eq!(
            SigningKey::from_material(&material, DigestAlgorithm::Sha1).err(),
            Some(Error::InvalidKeyMaterial)
        );
    }

    #[test]
    fn test_digest_length_bounds() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let signing_key = SigningKey::from_material(&material(), DigestAlgorithm::Md5).unwrap();

        assert_eq!(
            signing_key.sign_digest(&mut rng, &[]),
            Err(Error::InvalidMessageLength)
        );
        assert_eq!(
            signing_key.sign_digest(&mut rng, &[0u8; 65]),
            Err(Error::InvalidMessageLength)
        );
        // A 32-byte digest under an MD5 prefix is accepted.
        assert!(signing_key.sign_digest(&mut rng, &[7u8; 32]).is_ok());
    }

    #[test]
    fn test_pkcs8_roundtrip() {
        let signing_key = SigningKey::from_material(&material(), DigestAlgorithm::Sha256).unwrap();

        let der = signing_key.to_pkcs8_der().unwrap();
        let decoded = RsaPrivateKey::from_pkcs8_der(der.as_bytes()).unwrap();
        assert_eq!(SigningKey::new(decoded, DigestAlgorithm::Sha256), signing_key);
    }
}
