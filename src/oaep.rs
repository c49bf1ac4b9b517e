//! Encryption and Decryption using [OAEP padding](https://datatracker.ietf.org/doc/html/rfc8017#section-7.1).

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use digest::{Digest, DynDigest};
use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use crate::algorithms::oaep::{oaep_decrypt, oaep_encrypt};
use crate::algorithms::pad::{uint_to_be_pad, uint_to_zeroizing_be_pad};
use crate::algorithms::rsa::{rsa_decrypt_and_check, rsa_encrypt};
use crate::errors::{Error, Result};
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::traits::{PaddingScheme, PublicKeyParts};

/// Encryption and Decryption using [OAEP padding](https://datatracker.ietf.org/doc/html/rfc8017#section-7.1).
///
/// - `digest` is used to hash the label. The maximum possible plaintext length is `m = k - 2 * h_len - 2`,
///   where `k` is the size of the RSA modulus.
/// - `mgf_digest` specifies the hash function that is used in the [MGF1](https://datatracker.ietf.org/doc/html/rfc8017#appendix-B.2).
/// - `label` is optional data that can be associated with the message.
///
/// The two hash functions can, but don't need to be the same.
pub struct Oaep {
    /// Digest type to use.
    pub digest: Box<dyn DynDigest + Send + Sync>,

    /// Digest to use for Mask Generation Function (MGF).
    pub mgf_digest: Box<dyn DynDigest + Send + Sync>,

    /// Optional label.
    pub label: Option<String>,
}

impl Oaep {
    /// Create a new OAEP `PaddingScheme`, using `T` as the hash function for both the default (empty) label and for MGF1.
    pub fn new<T: 'static + Digest + DynDigest + Send + Sync>() -> Self {
        Self {
            digest: Box::new(T::new()),
            mgf_digest: Box::new(T::new()),
            label: None,
        }
    }

    /// Create a new OAEP `PaddingScheme` with an associated `label`, using `T` as the hash function for both the label and for MGF1.
    pub fn new_with_label<T: 'static + Digest + DynDigest + Send + Sync, S: AsRef<str>>(
        label: S,
    ) -> Self {
        Self {
            digest: Box::new(T::new()),
            mgf_digest: Box::new(T::new()),
            label: Some(label.as_ref().to_string()),
        }
    }

    /// Create a new OAEP `PaddingScheme`, using `T` as the hash function for the default (empty) label, and `U` as the hash function for MGF1.
    pub fn new_with_mgf_hash<
        T: 'static + Digest + DynDigest + Send + Sync,
        U: 'static + Digest + DynDigest + Send + Sync,
    >() -> Self {
        Self {
            digest: Box::new(T::new()),
            mgf_digest: Box::new(U::new()),
            label: None,
        }
    }

    /// Number of bytes this padding adds to a message.
    pub fn overhead(&self) -> usize {
        crate::algorithms::oaep::oaep_overhead(self.digest.output_size())
    }
}

impl PaddingScheme for Oaep {
    fn decrypt<Rng: CryptoRngCore + ?Sized>(
        mut self,
        rng: Option<&mut Rng>,
        priv_key: &RsaPrivateKey,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        decrypt(
            rng,
            priv_key,
            ciphertext,
            &mut *self.digest,
            &mut *self.mgf_digest,
            self.label,
        )
    }

    fn encrypt<Rng: CryptoRngCore + ?Sized>(
        mut self,
        rng: &mut Rng,
        pub_key: &RsaPublicKey,
        msg: &[u8],
    ) -> Result<Vec<u8>> {
        encrypt(
            rng,
            pub_key,
            msg,
            &mut *self.digest,
            &mut *self.mgf_digest,
            self.label,
        )
    }
}

impl fmt::Debug for Oaep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAEP")
            .field("digest", &"...")
            .field("mgf_digest", &"...")
            .field("label", &self.label)
            .finish()
    }
}

/// Encrypts the given message with RSA and the padding scheme from
/// [PKCS#1 OAEP].
///
/// The message must be no longer than the length of the public modulus minus
/// `2 + (2 * hash.size())`.
///
/// [PKCS#1 OAEP]: https://datatracker.ietf.org/doc/html/rfc8017#section-7.1
#[inline]
fn encrypt<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    pub_key: &RsaPublicKey,
    msg: &[u8],
    digest: &mut dyn DynDigest,
    mgf_digest: &mut dyn DynDigest,
    label: Option<String>,
) -> Result<Vec<u8>> {
    let label = label.unwrap_or_default();
    let em = oaep_encrypt(rng, msg, digest, mgf_digest, label.as_bytes(), pub_key.size())?;

    let int = Zeroizing::new(BigUint::from_bytes_be(&em));
    uint_to_be_pad(rsa_encrypt(pub_key, &int)?, pub_key.size())
}

/// Decrypts a plaintext using RSA and the padding scheme from [PKCS#1 OAEP].
///
/// If an `rng` is passed, it uses RSA blinding to avoid timing side-channel attacks.
///
/// Note that whether this function returns an error or not discloses secret
/// information. If an attacker can cause this function to run repeatedly and
/// learn whether each instance returned an error then they can decrypt and
/// forge signatures as if they had the private key.
///
/// [PKCS#1 OAEP]: https://datatracker.ietf.org/doc/html/rfc8017#section-7.1
#[inline]
fn decrypt<R: CryptoRngCore + ?Sized>(
    rng: Option<&mut R>,
    priv_key: &RsaPrivateKey,
    ciphertext: &[u8],
    digest: &mut dyn DynDigest,
    mgf_digest: &mut dyn DynDigest,
    label: Option<String>,
) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() > priv_key.size() {
        return Err(Error::Decryption);
    }

    let c = BigUint::from_bytes_be(ciphertext);
    let em = rsa_decrypt_and_check(priv_key, rng, &c)?;
    let mut em = uint_to_zeroizing_be_pad(em, priv_key.size())?;

    let label = label.unwrap_or_default();
    oaep_decrypt(&mut em, digest, mgf_digest, label.as_bytes(), priv_key.size())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::{
        rand_core::{RngCore, SeedableRng},
        ChaCha8Rng,
    };
    use sha1::Sha1;
    use sha2::{Sha224, Sha256, Sha384, Sha512};

    fn get_private_key() -> RsaPrivateKey {
        let mut rng = ChaCha8Rng::from_seed([11; 32]);
        let material = crate::engine::generate(&mut rng, 1024, 65537).unwrap();
        RsaPrivateKey::try_from(&material).unwrap()
    }

    fn do_test_encrypt_decrypt_oaep<D: 'static + Digest + DynDigest + Send + Sync>(
        prk: &RsaPrivateKey,
    ) {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);

        let k = prk.size();

        for i in 1..8 {
            let mut input = vec![0u8; i * 8];
            rng.fill_bytes(&mut input);

            let max = k - crate::algorithms::oaep::oaep_overhead(<D as Digest>::output_size());
            if input.len() > max {
                input = input[0..max].to_vec();
            }
            let label = if rng.next_u32() % 2 == 0 {
                None
            } else {
                Some(alloc::format!("label-{}", i))
            };

            let pub_key: RsaPublicKey = prk.into();

            let padding = match &label {
                Some(l) => Oaep::new_with_label::<D, _>(l),
                None => Oaep::new::<D>(),
            };
            let ciphertext = pub_key.encrypt(&mut rng, padding, &input).unwrap();
            assert_ne!(input, ciphertext);

            let padding = match &label {
                Some(l) => Oaep::new_with_label::<D, _>(l),
                None => Oaep::new::<D>(),
            };
            let plaintext = prk.decrypt_blinded(&mut rng, padding, &ciphertext).unwrap();
            assert_eq!(input, plaintext);
        }
    }

    #[test]
    fn test_encrypt_decrypt_oaep() {
        let priv_key = get_private_key();
        do_test_encrypt_decrypt_oaep::<Sha1>(&priv_key);
        do_test_encrypt_decrypt_oaep::<Sha224>(&priv_key);
        do_test_encrypt_decrypt_oaep::<Sha256>(&priv_key);
        do_test_encrypt_decrypt_oaep::<Sha384>(&priv_key);
    }

    #[test]
    fn test_oaep_mixed_digests() {
        let mut rng = ChaCha8Rng::from_seed([7; 32]);
        let priv_key = get_private_key();
        let pub_key = priv_key.to_public_key();

        let ct = pub_key
            .encrypt(&mut rng, Oaep::new_with_mgf_hash::<Sha256, Sha1>(), b"mixed")
            .unwrap();
        let pt = priv_key
            .decrypt_blinded(&mut rng, Oaep::new_with_mgf_hash::<Sha256, Sha1>(), &ct)
            .unwrap();
        assert_eq!(pt, b"mixed");

        assert!(priv_key
            .decrypt_blinded(&mut rng, Oaep::new::<Sha256>(), &ct)
            .is_err());
    }

    #[test]
    fn test_oaep_digest_too_large_for_key() {
        let mut rng = ChaCha8Rng::from_seed([7; 32]);
        let pub_key = get_private_key().to_public_key();
        assert_eq!(
            pub_key.encrypt(&mut rng, Oaep::new::<Sha512>(), b"x"),
            Err(Error::PlaintextTooLong)
        );
    }

    #[test]
    fn test_decrypt_oaep_invalid_hash() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let priv_key = get_private_key();
        let pub_key: RsaPublicKey = (&priv_key).into();
        let ciphertext = pub_key
            .encrypt(&mut rng, Oaep::new::<Sha1>(), "a_plain_text".as_bytes())
            .unwrap();
        assert!(
            priv_key
                .decrypt_blinded(&mut rng, Oaep::new_with_label::<Sha1, _>("label"), &ciphertext)
                .is_err(),
            "decrypt should have failed on hash verification"
        );
    }

    #[test]
    fn test_oaep_max_plaintext() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let priv_key = get_private_key();
        let pub_key = priv_key.to_public_key();
        let k = pub_key.size();

        let padding = Oaep::new::<Sha1>();
        assert_eq!(padding.overhead(), 42);

        let msg = vec![0x42u8; k - 42];
        let ct = pub_key.encrypt(&mut rng, Oaep::new::<Sha1>(), &msg).unwrap();
        assert_eq!(ct.len(), k);
        assert_eq!(
            priv_key.decrypt_blinded(&mut rng, Oaep::new::<Sha1>(), &ct).unwrap(),
            msg
        );

        let msg = vec![0x42u8; k - 41];
        assert_eq!(
            pub_key.encrypt(&mut rng, padding, &msg),
            Err(Error::PlaintextTooLong)
        );
    }
}
