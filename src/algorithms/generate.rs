//! Generate prime components for the RSA Private Key

use num_bigint::{BigUint, RandPrime};
use num_traits::One;
use rand_core::CryptoRngCore;

use crate::{
    algorithms::rsa::{compute_crt_values, compute_modulus, compute_private_exponent_euler_totient},
    errors::{Error, Result},
};

/// Smallest modulus size accepted by [`generate_key_with_exp`].
pub(crate) const MIN_MODULUS_BITS: usize = 512;

/// Largest modulus size accepted by [`generate_key_with_exp`].
pub(crate) const MAX_MODULUS_BITS: usize = 16384;

/// Smallest public exponent accepted by [`generate_key_with_exp`].
pub(crate) const MIN_PUB_EXPONENT: u64 = 3;

/// Largest public exponent accepted by [`generate_key_with_exp`].
pub(crate) const MAX_PUB_EXPONENT: u64 = (1 << 33) - 1;

pub(crate) struct RsaPrivateKeyComponents {
    pub n: BigUint,
    pub e: BigUint,
    pub d: BigUint,
    pub p: BigUint,
    pub q: BigUint,
    pub dp: BigUint,
    pub dq: BigUint,
    pub qinv: BigUint,
}

/// Generates a two-prime RSA keypair of the given bit size, public exponent,
/// and the given random source.
///
/// Each prime is drawn with its top two bits set, so the product always has
/// exactly `bit_size` bits and `bits(p) + bits(q) == bit_size`.
pub(crate) fn generate_key_with_exp<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    bit_size: usize,
    exp: u64,
) -> Result<RsaPrivateKeyComponents> {
    if !(MIN_MODULUS_BITS..=MAX_MODULUS_BITS).contains(&bit_size) {
        return Err(Error::InvalidKeyMaterial);
    }

    if !(MIN_PUB_EXPONENT..=MAX_PUB_EXPONENT).contains(&exp) || exp & 1 == 0 {
        return Err(Error::InvalidKeyMaterial);
    }

    let e = BigUint::from(exp);

    loop {
        let p_bits = bit_size / 2;
        let p = rng.gen_prime(p_bits);
        let q = rng.gen_prime(bit_size - p_bits);

        if p == q {
            continue;
        }

        let n = compute_modulus(&p, &q);

        if n.bits() != bit_size {
            // This should never happen because gen_prime sets the top two
            // bits of each prime.
            continue;
        }

        // `e` sharing a factor with p - 1 or q - 1 leaves d undefined; draw
        // fresh primes rather than change the caller's exponent.
        let d = match compute_private_exponent_euler_totient(rng, &p, &q, &e) {
            Ok(d) => d,
            Err(Error::KeyCompletionFailed) => continue,
            Err(err) => return Err(err),
        };

        if d <= BigUint::one() {
            continue;
        }

        let (dp, dq, qinv) = compute_crt_values(rng, &d, &p, &q)?;

        return Ok(RsaPrivateKeyComponents {
            n,
            e,
            d,
            p,
            q,
            dp,
            dq,
            qinv,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_integer::Integer;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    const EXP: u64 = 65537;

    #[test]
    fn test_rejects_out_of_range_parameters() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);

        for bits in [0, 64, 511, 16385] {
            assert_eq!(
                generate_key_with_exp(&mut rng, bits, EXP).err(),
                Some(Error::InvalidKeyMaterial)
            );
        }

        for exp in [0, 1, 2, 65536, 1 << 33, u64::MAX] {
            assert_eq!(
                generate_key_with_exp(&mut rng, 512, exp).err(),
                Some(Error::InvalidKeyMaterial)
            );
        }
    }

    macro_rules! key_generation {
        ($name:ident, $size:expr, $exp:expr) => {
            #[test]
            fn $name() {
                let mut rng = ChaCha8Rng::from_seed([42; 32]);
                for _ in 0..4 {
                    let c = generate_key_with_exp(&mut rng, $size, $exp).unwrap();
                    assert_eq!(c.n.bits(), $size);
                    assert_eq!(c.p.bits() + c.q.bits(), $size);
                    assert_eq!(&c.p * &c.q, c.n);
                    assert_eq!(c.e, BigUint::from($exp as u64));

                    let one = BigUint::one();
                    let p1 = &c.p - &one;
                    let q1 = &c.q - &one;
                    assert!(((&c.d * &c.e) % (&p1 * &q1)).is_one());
                    assert_eq!(c.dp, &c.d % &p1);
                    assert_eq!(c.dq, &c.d % &q1);
                    assert!(((&c.qinv * &c.q) % &c.p).is_one());
                    assert!(c.p.is_odd() && c.q.is_odd());
                }
            }
        };
    }

    key_generation!(key_generation_512, 512, EXP);
    key_generation!(key_generation_513, 513, EXP);
    key_generation!(key_generation_1024, 1024, EXP);
    key_generation!(key_generation_512_exp3, 512, 3);
    key_generation!(key_generation_512_exp33_bits, 512, MAX_PUB_EXPONENT);
}
