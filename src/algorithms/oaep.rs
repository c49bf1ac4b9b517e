//! Encryption and Decryption using [OAEP padding](https://datatracker.ietf.org/doc/html/rfc8017#section-7.1).
//!
use alloc::vec::Vec;

use digest::DynDigest;
use rand_core::CryptoRngCore;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroizing;

use super::mgf::mgf1_xor;
use crate::errors::{Error, Result};

/// Number of bytes OAEP adds around a message for a digest of `h_size` bytes.
#[inline]
pub(crate) const fn oaep_overhead(h_size: usize) -> usize {
    2 * h_size + 2
}

/// Encrypts the given message with RSA and the padding scheme from
/// [PKCS#1 OAEP].
///
/// The message must be no longer than the length of the public modulus minus
/// `2 + (2 * hash.size())`.
///
/// [PKCS#1 OAEP]: https://datatracker.ietf.org/doc/html/rfc8017#section-7.1
#[inline]
pub(crate) fn oaep_encrypt<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    msg: &[u8],
    digest: &mut dyn DynDigest,
    mgf_digest: &mut dyn DynDigest,
    label: &[u8],
    k: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let h_size = digest.output_size();

    if msg.len() + oaep_overhead(h_size) > k {
        return Err(Error::PlaintextTooLong);
    }

    digest.update(label);
    let p_hash = digest.finalize_reset();

    let mut em = Zeroizing::new(vec![0u8; k]);

    let (_, payload) = em.split_at_mut(1);
    let (seed, db) = payload.split_at_mut(h_size);
    rng.fill_bytes(seed);

    // Data block DB =  pHash || PS || 01 || M
    let db_len = k - h_size - 1;

    db[0..h_size].copy_from_slice(&p_hash);
    db[db_len - msg.len() - 1] = 1;
    db[db_len - msg.len()..].copy_from_slice(msg);

    mgf1_xor(db, mgf_digest, seed);
    mgf1_xor(seed, mgf_digest, db);

    Ok(em)
}

/// Decrypts OAEP padding.
///
/// Note that whether this function returns an error or not discloses secret
/// information. If an attacker can cause this function to run repeatedly and
/// learn whether each instance returned an error then they can decrypt and
/// forge signatures as if they had the private key.
///
/// [PKCS#1 OAEP]: https://datatracker.ietf.org/doc/html/rfc8017#section-7.1
#[inline]
pub(crate) fn oaep_decrypt(
    em: &mut [u8],
    digest: &mut dyn DynDigest,
    mgf_digest: &mut dyn DynDigest,
    label: &[u8],
    k: usize,
) -> Result<Vec<u8>> {
    let h_size = digest.output_size();

    digest.update(label);
    let expected_p_hash = digest.finalize_reset();

    let res = decrypt_inner(em, h_size, &expected_p_hash, k, mgf_digest)?;
    let index = Option::<u32>::from(res).ok_or(Error::Decryption)?;

    Ok(em[index as usize..].to_vec())
}

/// Unmasks `em` in place. The returned option is only set when the plaintext
/// was correctly structured, in which case it holds the message offset.
#[inline]
fn decrypt_inner(
    em: &mut [u8],
    h_size: usize,
    expected_p_hash: &[u8],
    k: usize,
    mgf_digest: &mut dyn DynDigest,
) -> Result<CtOption<u32>> {
    if k < 11 || em.len() != k || k < oaep_overhead(h_size) {
        return Err(Error::Decryption);
    }

    let first_byte_is_zero = em[0].ct_eq(&0u8);

    let (_, payload) = em.split_at_mut(1);
    let (seed, db) = payload.split_at_mut(h_size);

    mgf1_xor(seed, mgf_digest, db);
    mgf1_xor(db, mgf_digest, seed);

    let hash_are_equal = db[0..h_size].ct_eq(expected_p_hash);

    // The remainder of the plaintext must be zero or more 0x00, followed
    // by 0x01, followed by the message.
    //   looking_for_index: 1 if we are still looking for the 0x01
    //   index: the offset of the first 0x01 byte
    //   nonzero_before_one: 1 if we saw a non-zero byte before the 1
    let mut looking_for_index = Choice::from(1u8);
    let mut index = 0u32;
    let mut nonzero_before_one = Choice::from(0u8);

    for (i, el) in db.iter().skip(h_size).enumerate() {
        let equals0 = el.ct_eq(&0u8);
        let equals1 = el.ct_eq(&1u8);
        index.conditional_assign(&(i as u32), looking_for_index & equals1);
        looking_for_index &= !equals1;
        nonzero_before_one |= looking_for_index & !equals0;
    }

    let valid = first_byte_is_zero & hash_are_equal & !nonzero_before_one & !looking_for_index;

    Ok(CtOption::new(index + 2 + (h_size * 2) as u32, valid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
    use sha1::{Digest, Sha1};

    #[test]
    fn test_pad_unpad() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let k = 128;
        let msg = b"hello world";

        let mut em = oaep_encrypt(&mut rng, msg, &mut Sha1::new(), &mut Sha1::new(), b"", k)
            .unwrap();
        assert_eq!(em[0], 0);

        let out = oaep_decrypt(&mut em, &mut Sha1::new(), &mut Sha1::new(), b"", k).unwrap();
        assert_eq!(out, msg);
    }

    #[test]
    fn test_label_mismatch() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let k = 128;

        let mut em = oaep_encrypt(
            &mut rng,
            b"hello",
            &mut Sha1::new(),
            &mut Sha1::new(),
            b"label",
            k,
        )
        .unwrap();

        let res = oaep_decrypt(&mut em, &mut Sha1::new(), &mut Sha1::new(), b"other", k);
        assert_eq!(res, Err(Error::Decryption));
    }

    #[test]
    fn test_message_bound() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let k = 64;
        let max = k - oaep_overhead(20);

        assert!(oaep_encrypt(
            &mut rng,
            &vec![7u8; max],
            &mut Sha1::new(),
            &mut Sha1::new(),
            b"",
            k
        )
        .is_ok());
        assert_eq!(
            oaep_encrypt(
                &mut rng,
                &vec![7u8; max + 1],
                &mut Sha1::new(),
                &mut Sha1::new(),
                b"",
                k
            ),
            Err(Error::PlaintextTooLong)
        );
    }
}
