//! MGF1 mask generation for OAEP padding.

use digest::DynDigest;

/// XORs `out` with the MGF1 mask derived from `seed`.
///
/// Panics if the mask would need more than 2**32 digest blocks. This is in
/// accordance with RFC 8017 - PKCS #1 B.2.1
pub(crate) fn mgf1_xor(out: &mut [u8], digest: &mut dyn DynDigest, seed: &[u8]) {
    let h_len = digest.output_size();
    assert!(out.len() as u64 <= (u32::MAX as u64 + 1) * h_len as u64);

    for (counter, chunk) in out.chunks_mut(h_len).enumerate() {
        digest.update(seed);
        digest.update(&(counter as u32).to_be_bytes());

        let mask = digest.finalize_reset();
        for (o, m) in chunk.iter_mut().zip(mask.iter()) {
            *o ^= m;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use sha1::{Digest, Sha1};

    #[test]
    fn test_mgf1_sha1() {
        let mut digest = Sha1::new();

        let mut out = [0u8; 5];
        mgf1_xor(&mut out, &mut digest, b"foo");
        assert_eq!(out, hex!("1ac9075cd4"));

        let mut out = [0u8; 50];
        mgf1_xor(&mut out, &mut digest, b"bar");
        assert_eq!(
            out,
            hex!(
                "bc0c655e016bc2931d85a2e675181adcef7f581f76df2739da74faac41627be2"
                "f7f415c89e983fd0ce80ced9878641cb4876"
            )
        );
    }

    #[test]
    fn test_mgf1_xor_is_involution() {
        let mut digest = Sha1::new();
        let mut out = *b"some data block to mask";
        mgf1_xor(&mut out, &mut digest, b"seed");
        assert_ne!(&out, b"some data block to mask");
        mgf1_xor(&mut out, &mut digest, b"seed");
        assert_eq!(&out, b"some data block to mask");
    }
}
