//! Generic RSA implementation

use alloc::borrow::Cow;
use num_bigint::{BigUint, IntoBigUint, ModInverse, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{Error, Result};
use crate::traits::{PrivateKeyParts, PublicKeyParts};

/// Number of random bits used to mask a secret before a reduction.
const REDUCTION_MASK_BITS: usize = 64;

/// ⚠️ Raw RSA encryption of m with the public key. No padding is performed.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! Raw RSA should never be used without an appropriate padding
/// or signature scheme. See the [module-level documentation][crate::hazmat] for more information.
#[inline]
pub fn rsa_encrypt<K: PublicKeyParts>(key: &K, m: &BigUint) -> Result<BigUint> {
    Ok(m.modpow(key.e(), key.n()))
}

/// ⚠️ Performs raw RSA decryption with no padding or error checking.
///
/// Returns a plaintext `BigUint`. Performs RSA blinding if an `Rng` is passed.
/// The CRT values of the key are always used.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! Raw RSA should never be used without an appropriate padding
/// or signature scheme. See the [module-level documentation][crate::hazmat] for more information.
#[inline]
pub fn rsa_decrypt<R: CryptoRngCore + ?Sized>(
    rng: Option<&mut R>,
    priv_key: &impl PrivateKeyParts,
    c: &BigUint,
) -> Result<BigUint> {
    if priv_key.n().is_zero() || priv_key.p().is_zero() || priv_key.q().is_zero() {
        return Err(Error::Decryption);
    }

    if c >= priv_key.n() {
        return Err(Error::Decryption);
    }

    let mut ir = None;

    let c = match rng {
        Some(rng) => {
            let (blinded, unblinder) = blind(rng, priv_key, c);
            ir = Some(unblinder);
            Cow::Owned(blinded)
        }
        None => Cow::Borrowed(c),
    };

    let p = priv_key.p();
    let q = priv_key.q();

    let mut m1 = c.modpow(priv_key.dp(), p);
    let mut m2 = c.modpow(priv_key.dq(), q);

    // h = qinv * (m1 - m2) mod p
    let mut m2_mod_p = &m2 % p;
    let mut h = if m1 >= m2_mod_p {
        &m1 - &m2_mod_p
    } else {
        &m1 + p - &m2_mod_p
    };
    h *= priv_key.qinv();
    h %= p;

    let m = &m2 + &h * q;

    // clear tmp values
    m1.zeroize();
    m2.zeroize();
    m2_mod_p.zeroize();
    h.zeroize();
    if let Cow::Owned(mut blinded) = c {
        blinded.zeroize();
    }

    match ir {
        Some(mut ir) => {
            let out = unblind(priv_key, &m, &ir);
            ir.zeroize();
            Ok(out)
        }
        None => Ok(m),
    }
}

/// ⚠️ Performs raw RSA decryption with no padding.
///
/// Returns a plaintext `BigUint`. Performs RSA blinding if an `Rng` is passed.  This will also
/// check for errors in the CRT computation.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! Raw RSA should never be used without an appropriate padding
/// or signature scheme. See the [module-level documentation][crate::hazmat] for more information.
#[inline]
pub fn rsa_decrypt_and_check<R: CryptoRngCore + ?Sized>(
    priv_key: &impl PrivateKeyParts,
    rng: Option<&mut R>,
    c: &BigUint,
) -> Result<BigUint> {
    let m = rsa_decrypt(rng, priv_key, c)?;

    // In order to defend against errors in the CRT computation, m^e is
    // calculated, which should match the original ciphertext.
    let check = rsa_encrypt(priv_key, &m)?;

    if c != &check {
        return Err(Error::PrimitiveFailure);
    }

    Ok(m)
}

/// Returns the blinded c, along with the unblinding factor.
fn blind<R: CryptoRngCore + ?Sized, K: PublicKeyParts>(
    rng: &mut R,
    key: &K,
    c: &BigUint,
) -> (BigUint, BigUint) {
    // Blinding involves multiplying c by r^e.
    // Then the decryption operation performs (m^e * r^e)^d mod n
    // which equals mr mod n. The factor of r can then be removed
    // by multiplying by the multiplicative inverse of r.

    let mut r: BigUint;
    let unblinder;
    loop {
        r = rng.gen_biguint_below(key.n());
        if r.is_zero() {
            r = BigUint::one();
        }
        if let Some(ub) = r.clone().mod_inverse(key.n()).and_then(|ir| ir.into_biguint()) {
            unblinder = ub;
            break;
        }
    }

    let c = {
        let mut rpowe = r.modpow(key.e(), key.n()); // N != 0
        let mut c = c * &rpowe;
        c %= key.n();

        rpowe.zeroize();

        c
    };

    r.zeroize();

    (c, unblinder)
}

/// Given an m and and unblinding factor, unblind the m.
fn unblind(key: &impl PublicKeyParts, m: &BigUint, unblinder: &BigUint) -> BigUint {
    (m * unblinder) % key.n()
}

/// Constant-time execution mode for the secret-dependent steps of key
/// completion and generation.
///
/// `num-bigint-dig` has no constant-time arithmetic, so every operation routed
/// through this mode is blinded with fresh randomness first: the variable-time
/// code only ever sees a masked operand.
pub(crate) struct ConstTime<'a, R: CryptoRngCore + ?Sized> {
    rng: &'a mut R,
}

impl<'a, R: CryptoRngCore + ?Sized> ConstTime<'a, R> {
    pub(crate) fn new(rng: &'a mut R) -> Self {
        Self { rng }
    }

    /// Returns `a^-1 mod m`, computed as `(a * r)^-1 * r` for a random unit `r`.
    pub(crate) fn mod_inverse(&mut self, a: &BigUint, m: &BigUint) -> Result<BigUint> {
        if m <= &BigUint::one() {
            return Err(Error::KeyCompletionFailed);
        }

        let a = Zeroizing::new(a % m);

        loop {
            let mut r = self.rng.gen_biguint_below(m);
            if r.is_zero() || !r.gcd(m).is_one() {
                r.zeroize();
                continue;
            }

            let blinded = Zeroizing::new((&*a * &r) % m);
            let inv = (*blinded)
                .clone()
                .mod_inverse(m)
                .and_then(|inv| inv.into_biguint());

            let out = match inv {
                Some(mut inv) => {
                    let out = (&inv * &r) % m;
                    inv.zeroize();
                    Ok(out)
                }
                None => Err(Error::KeyCompletionFailed),
            };

            r.zeroize();
            return out;
        }
    }

    /// Returns `d mod m`, reducing `d + k * m` for a random `k`.
    pub(crate) fn reduce(&mut self, d: &BigUint, m: &BigUint) -> Result<BigUint> {
        if m.is_zero() {
            return Err(Error::KeyCompletionFailed);
        }

        let mut k = self.rng.gen_biguint(REDUCTION_MASK_BITS);
        let masked = Zeroizing::new(d + &k * m);
        k.zeroize();

        Ok(&*masked % m)
    }
}

/// Computes the modulus from the two prime factors.
pub(crate) fn compute_modulus(p: &BigUint, q: &BigUint) -> BigUint {
    p * q
}

/// Returns `(p - 1, q - 1, (p - 1)(q - 1))`.
///
/// Fails when either factor is below two, since the totient would be zero.
pub(crate) fn compute_totient(
    p: &BigUint,
    q: &BigUint,
) -> Result<(Zeroizing<BigUint>, Zeroizing<BigUint>, Zeroizing<BigUint>)> {
    let one = BigUint::one();
    if p <= &one || q <= &one {
        return Err(Error::KeyCompletionFailed);
    }

    let r1 = Zeroizing::new(p - &one);
    let r2 = Zeroizing::new(q - &one);
    let totient = Zeroizing::new(&*r1 * &*r2);

    Ok((r1, r2, totient))
}

/// Compute the private exponent from its public counterpart (or the other way
/// around, the relation is symmetric) using the Euler totient.
pub(crate) fn compute_private_exponent_euler_totient<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    p: &BigUint,
    q: &BigUint,
    exp: &BigUint,
) -> Result<BigUint> {
    let (_, _, totient) = compute_totient(p, q)?;
    ConstTime::new(rng).mod_inverse(exp, &totient)
}

/// Computes `(dp, dq, qinv)` for the given private exponent and primes.
pub(crate) fn compute_crt_values<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    d: &BigUint,
    p: &BigUint,
    q: &BigUint,
) -> Result<(BigUint, BigUint, BigUint)> {
    let (r1, r2, _) = compute_totient(p, q)?;
    let mut ct = ConstTime::new(rng);

    let dp = ct.reduce(d, &r1)?;
    let dq = ct.reduce(d, &r2)?;
    let qinv = ct.mod_inverse(q, p)?;

    Ok((dp, dq, qinv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    #[test]
    fn test_const_time_mod_inverse() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let mut ct = ConstTime::new(&mut rng);

        let m = BigUint::from_u64(3120).unwrap();
        let a = BigUint::from_u64(17).unwrap();
        let inv = ct.mod_inverse(&a, &m).unwrap();
        assert_eq!(inv, BigUint::from_u64(2753).unwrap());

        for _ in 0..16 {
            assert_eq!(ct.mod_inverse(&a, &m).unwrap(), inv);
        }
    }

    #[test]
    fn test_const_time_mod_inverse_not_invertible() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let mut ct = ConstTime::new(&mut rng);

        let m = BigUint::from_u64(3120).unwrap();
        let a = BigUint::from_u64(15).unwrap();
        assert_eq!(ct.mod_inverse(&a, &m), Err(Error::KeyCompletionFailed));
        assert_eq!(
            ct.mod_inverse(&a, &BigUint::one()),
            Err(Error::KeyCompletionFailed)
        );
    }

    #[test]
    fn test_const_time_reduce() {
        let mut rng = ChaCha8Rng::from_seed([7; 32]);
        let mut ct = ConstTime::new(&mut rng);

        let d = BigUint::from_u64(2753).unwrap();
        let m = BigUint::from_u64(60).unwrap();
        assert_eq!(ct.reduce(&d, &m).unwrap(), BigUint::from_u64(53).unwrap());
        assert_eq!(
            ct.reduce(&d, &BigUint::zero()),
            Err(Error::KeyCompletionFailed)
        );
    }

    #[test]
    fn test_compute_totient_rejects_units() {
        let one = BigUint::one();
        let seven = BigUint::from_u64(7).unwrap();
        assert!(compute_totient(&one, &seven).is_err());
        assert!(compute_totient(&seven, &BigUint::zero()).is_err());

        let (r1, r2, totient) = compute_totient(&seven, &BigUint::from_u64(11).unwrap()).unwrap();
        assert_eq!(*r1, BigUint::from_u64(6).unwrap());
        assert_eq!(*r2, BigUint::from_u64(10).unwrap());
        assert_eq!(*totient, BigUint::from_u64(60).unwrap());
    }

    #[test]
    fn test_compute_crt_values() {
        let mut rng = ChaCha8Rng::from_seed([1; 32]);
        // textbook key: p = 61, q = 53, e = 17, d = 2753
        let p = BigUint::from_u64(61).unwrap();
        let q = BigUint::from_u64(53).unwrap();
        let e = BigUint::from_u64(17).unwrap();

        let d = compute_private_exponent_euler_totient(&mut rng, &p, &q, &e).unwrap();
        assert_eq!(d, BigUint::from_u64(2753).unwrap());

        let (dp, dq, qinv) = compute_crt_values(&mut rng, &d, &p, &q).unwrap();
        assert_eq!(dp, BigUint::from_u64(53).unwrap());
        assert_eq!(dq, BigUint::from_u64(49).unwrap());
        assert_eq!(qinv, BigUint::from_u64(38).unwrap());
    }
}
