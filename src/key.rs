use alloc::vec::Vec;
use core::fmt;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::algorithms::generate::generate_key_with_exp;
use crate::algorithms::rsa::{compute_modulus, rsa_decrypt_and_check};
use crate::errors::{Error, Result};
use crate::material::RsaKeyMaterial;
use crate::traits::{PaddingScheme, PrivateKeyParts, PublicKeyParts, SignatureScheme};

/// Number of Miller-Rabin rounds used when checking the prime factors.
const PRIMALITY_ROUNDS: usize = 20;

/// Represents the public part of an RSA key.
///
/// Built from [`RsaKeyMaterial`] that passed the public bounds check and kept
/// only for the duration of an operation.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct RsaPublicKey {
    /// Modulus: product of prime numbers `p` and `q`
    n: BigUint,
    /// Public exponent
    e: BigUint,
}

/// Represents a whole RSA key, public and private parts.
#[derive(Clone)]
pub struct RsaPrivateKey {
    /// Public components of the private key.
    pubkey_components: RsaPublicKey,
    /// Private exponent
    d: BigUint,
    p: BigUint,
    q: BigUint,
    /// D mod (P-1)
    dp: BigUint,
    /// D mod (Q-1)
    dq: BigUint,
    /// Q^-1 mod P
    qinv: BigUint,
}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("pubkey_components", &self.pubkey_components)
            .finish_non_exhaustive()
    }
}

impl Eq for RsaPrivateKey {}

impl PartialEq for RsaPrivateKey {
    #[inline]
    fn eq(&self, other: &RsaPrivateKey) -> bool {
        self.pubkey_components == other.pubkey_components
            && self.d == other.d
            && self.p == other.p
            && self.q == other.q
    }
}

impl AsRef<RsaPublicKey> for RsaPrivateKey {
    fn as_ref(&self) -> &RsaPublicKey {
        &self.pubkey_components
    }
}

impl Zeroize for RsaPrivateKey {
    fn zeroize(&mut self) {
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
        self.dp.zeroize();
        self.dq.zeroize();
        self.qinv.zeroize();
    }
}

impl Drop for RsaPrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for RsaPrivateKey {}

impl From<RsaPrivateKey> for RsaPublicKey {
    fn from(private_key: RsaPrivateKey) -> Self {
        (&private_key).into()
    }
}

impl From<&RsaPrivateKey> for RsaPublicKey {
    fn from(private_key: &RsaPrivateKey) -> Self {
        private_key.to_public_key()
    }
}

impl PublicKeyParts for RsaPublicKey {
    fn n(&self) -> &BigUint {
        &self.n
    }

    fn e(&self) -> &BigUint {
        &self.e
    }
}

impl PublicKeyParts for RsaPrivateKey {
    fn n(&self) -> &BigUint {
        &self.pubkey_components.n
    }

    fn e(&self) -> &BigUint {
        &self.pubkey_components.e
    }
}

impl PrivateKeyParts for RsaPrivateKey {
    fn d(&self) -> &BigUint {
        &self.d
    }

    fn p(&self) -> &BigUint {
        &self.p
    }

    fn q(&self) -> &BigUint {
        &self.q
    }

    fn dp(&self) -> &BigUint {
        &self.dp
    }

    fn dq(&self) -> &BigUint {
        &self.dq
    }

    fn qinv(&self) -> &BigUint {
        &self.qinv
    }
}

impl TryFrom<&RsaKeyMaterial> for RsaPublicKey {
    type Error = Error;

    fn try_from(material: &RsaKeyMaterial) -> Result<Self> {
        if !material.is_valid_public() {
            return Err(Error::InvalidKeyMaterial);
        }

        Ok(Self {
            n: BigUint::from_bytes_be(&material.n),
            e: BigUint::from_bytes_be(&material.e),
        })
    }
}

impl TryFrom<&RsaKeyMaterial> for RsaPrivateKey {
    type Error = Error;

    fn try_from(material: &RsaKeyMaterial) -> Result<Self> {
        if !material.is_valid_private() {
            return Err(Error::InvalidKeyMaterial);
        }

        Ok(Self {
            pubkey_components: RsaPublicKey::try_from(material)?,
            d: BigUint::from_bytes_be(&material.d),
            p: BigUint::from_bytes_be(&material.p),
            q: BigUint::from_bytes_be(&material.q),
            dp: BigUint::from_bytes_be(&material.dp),
            dq: BigUint::from_bytes_be(&material.dq),
            qinv: BigUint::from_bytes_be(&material.qinv),
        })
    }
}

impl From<&RsaPublicKey> for RsaKeyMaterial {
    fn from(key: &RsaPublicKey) -> Self {
        RsaKeyMaterial::public(key.n.to_bytes_be(), key.e.to_bytes_be())
    }
}

impl From<&RsaPrivateKey> for RsaKeyMaterial {
    fn from(key: &RsaPrivateKey) -> Self {
        RsaKeyMaterial::private(
            key.n().to_bytes_be(),
            key.e().to_bytes_be(),
            key.d.to_bytes_be(),
            key.p.to_bytes_be(),
            key.q.to_bytes_be(),
            key.dp.to_bytes_be(),
            key.dq.to_bytes_be(),
            key.qinv.to_bytes_be(),
        )
    }
}

impl RsaPublicKey {
    /// Create a new public key from its components.
    ///
    /// Goes through the same bounds check as keys built from
    /// [`RsaKeyMaterial`].
    pub fn new(n: BigUint, e: BigUint) -> Result<Self> {
        RsaPublicKey::try_from(&RsaKeyMaterial::public(n.to_bytes_be(), e.to_bytes_be()))
    }

    /// Encrypt the given message.
    pub fn encrypt<R: CryptoRngCore + ?Sized, P: PaddingScheme>(
        &self,
        rng: &mut R,
        padding: P,
        msg: &[u8],
    ) -> Result<Vec<u8>> {
        padding.encrypt(rng, self, msg)
    }

    /// Verify a signed message.
    ///
    /// `hashed` must be the result of hashing the input using the hashing function
    /// passed in through `hash`.
    ///
    /// If the message is valid `Ok(())` is returned, otherwise an `Err` indicating failure.
    pub fn verify<S: SignatureScheme>(&self, scheme: S, hashed: &[u8], sig: &[u8]) -> Result<()> {
        scheme.verify(self, hashed, sig)
    }
}

impl RsaPrivateKey {
    /// Generate a new two-prime RSA key pair of the given bit size and public
    /// exponent.
    pub fn new_with_exp<R: CryptoRngCore + ?Sized>(
        rng: &mut R,
        bit_size: usize,
        exp: u64,
    ) -> Result<RsaPrivateKey> {
        let components = generate_key_with_exp(rng, bit_size, exp)?;

        Ok(RsaPrivateKey {
            pubkey_components: RsaPublicKey {
                n: components.n,
                e: components.e,
            },
            d: components.d,
            p: components.p,
            q: components.q,
            dp: components.dp,
            dq: components.dq,
            qinv: components.qinv,
        })
    }

    /// Get the public key from the private key, cloning `n` and `e`.
    ///
    /// Generally this is not needed since `RsaPrivateKey` implements [`PublicKeyParts`],
    /// but it can occasionally be useful to discard the private information entirely.
    pub fn to_public_key(&self) -> RsaPublicKey {
        self.pubkey_components.clone()
    }

    /// Performs basic sanity checks on the key.
    /// Returns `Ok(())` if everything is good, otherwise an appropriate error.
    ///
    /// Checks that both factors are probable primes, that they multiply to
    /// the modulus, that `d` inverts `e`, and that the CRT values match `d`.
    pub fn validate(&self) -> Result<()> {
        let one = BigUint::one();

        // Any primes ≤ 1 will cause divide-by-zero panics later.
        if self.p <= one || self.q <= one {
            return Err(Error::InvalidKeyMaterial);
        }

        if !num_bigint::prime::probably_prime(&self.p, PRIMALITY_ROUNDS)
            || !num_bigint::prime::probably_prime(&self.q, PRIMALITY_ROUNDS)
        {
            return Err(Error::InvalidKeyMaterial);
        }

        if compute_modulus(&self.p, &self.q) != self.pubkey_components.n {
            return Err(Error::InvalidKeyMaterial);
        }

        // Check that de ≡ 1 mod p-1, for each prime.
        let p1 = &self.p - &one;
        let q1 = &self.q - &one;
        let de = self.e() * &self.d;
        for prime in [&p1, &q1] {
            let congruence: BigUint = &de % prime;
            if !congruence.is_one() {
                return Err(Error::InvalidKeyMaterial);
            }
        }

        if self.dp != &self.d % &p1 || self.dq != &self.d % &q1 {
            return Err(Error::InvalidKeyMaterial);
        }

        if self.qinv.is_zero() || !(&self.qinv * &self.q).mod_floor(&self.p).is_one() {
            return Err(Error::InvalidKeyMaterial);
        }

        Ok(())
    }

    /// Decrypt the given message.
    ///
    /// Uses `rng` to blind the decryption process. The CRT result is always
    /// re-encrypted and compared to the input before anything is returned.
    pub fn decrypt_blinded<R: CryptoRngCore + ?Sized, P: PaddingScheme>(
        &self,
        rng: &mut R,
        padding: P,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        padding.decrypt(Some(rng), self, ciphertext)
    }

    /// Sign the given digest using the provided `rng`, which is used in the
    /// following ways depending on the [`SignatureScheme`]:
    ///
    /// - [`Pkcs1v15Sign`][`crate::Pkcs1v15Sign`] padding: uses the RNG
    ///   to mask the private key operation with random blinding, which helps
    ///   mitigate sidechannel attacks.
    pub fn sign_with_rng<R: CryptoRngCore + ?Sized, S: SignatureScheme>(
        &self,
        rng: &mut R,
        padding: S,
        digest_in: &[u8],
    ) -> Result<Vec<u8>> {
        padding.sign(Some(rng), self, digest_in)
    }

    /// Raw blinded private-key operation with the CRT fault check.
    pub(crate) fn raw_decrypt<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        c: &BigUint,
    ) -> Result<BigUint> {
        rsa_decrypt_and_check(self, Some(rng), c)
    }
}
