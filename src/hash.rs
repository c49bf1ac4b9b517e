//! Digest algorithms usable with PKCS#1 v1.5 signatures.

use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use const_oid::ObjectIdentifier;

use crate::algorithms::pkcs1v15::pkcs1v15_generate_prefix;
use crate::errors::{Error, Result};

/// A digest algorithm, identified by name and by OID.
///
/// Only the `DigestInfo` prefix is derived from the algorithm; callers hash
/// the message themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// MD5
    Md5,
    /// RIPEMD-160
    Ripemd160,
    /// SHA-1
    Sha1,
    /// SHA-224
    Sha224,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl DigestAlgorithm {
    /// Every supported algorithm.
    pub const ALL: [DigestAlgorithm; 7] = [
        DigestAlgorithm::Md5,
        DigestAlgorithm::Ripemd160,
        DigestAlgorithm::Sha1,
        DigestAlgorithm::Sha224,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha512,
    ];

    /// Returns the lowercase name used to select the algorithm.
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Ripemd160 => "ripemd160",
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha224 => "sha224",
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha384 => "sha384",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }

    /// Returns the length in bytes of a digest.
    pub fn output_size(self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 16,
            DigestAlgorithm::Ripemd160 => 20,
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha224 => 28,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    /// Returns the algorithm's object identifier.
    pub fn oid(self) -> ObjectIdentifier {
        match self {
            DigestAlgorithm::Md5 => ObjectIdentifier::new_unwrap("1.2.840.113549.2.5"),
            DigestAlgorithm::Ripemd160 => ObjectIdentifier::new_unwrap("1.3.36.3.2.1"),
            DigestAlgorithm::Sha1 => ObjectIdentifier::new_unwrap("1.3.14.3.2.26"),
            DigestAlgorithm::Sha224 => ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.4"),
            DigestAlgorithm::Sha256 => ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1"),
            DigestAlgorithm::Sha384 => ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.2"),
            DigestAlgorithm::Sha512 => ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.3"),
        }
    }

    /// Returns the ASN.1 DER `DigestInfo` prefix for the algorithm.
    pub fn prefix(self) -> Vec<u8> {
        pkcs1v15_generate_prefix(&self.oid(), self.output_size())
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DigestAlgorithm::ALL
            .into_iter()
            .find(|alg| alg.name() == s)
            .ok_or(Error::UnsupportedAlgorithm)
    }
}

impl TryFrom<ObjectIdentifier> for DigestAlgorithm {
    type Error = Error;

    fn try_from(oid: ObjectIdentifier) -> Result<Self> {
        DigestAlgorithm::ALL
            .into_iter()
            .find(|alg| alg.oid() == oid)
            .ok_or(Error::UnsupportedAlgorithm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use const_oid::AssociatedOid;
    use hex_literal::hex;

    #[test]
    fn test_prefixes() {
        let cases: [(DigestAlgorithm, &[u8]); 7] = [
            (DigestAlgorithm::Md5, &hex!("3020300c06082a864886f70d020505000410")),
            (DigestAlgorithm::Ripemd160, &hex!("3021300906052b2403020105000414")),
            (DigestAlgorithm::Sha1, &hex!("3021300906052b0e03021a05000414")),
            (DigestAlgorithm::Sha224, &hex!("302d300d06096086480165030402040500041c")),
            (DigestAlgorithm::Sha256, &hex!("3031300d060960864801650304020105000420")),
            (DigestAlgorithm::Sha384, &hex!("3041300d060960864801650304020205000430")),
            (DigestAlgorithm::Sha512, &hex!("3051300d060960864801650304020305000440")),
        ];

        for (alg, prefix) in cases {
            assert_eq!(alg.prefix(), prefix, "{}", alg);
        }
    }

    #[test]
    fn test_names() {
        for alg in DigestAlgorithm::ALL {
            assert_eq!(alg.name().parse::<DigestAlgorithm>(), Ok(alg));
            assert_eq!(DigestAlgorithm::try_from(alg.oid()), Ok(alg));
        }

        assert_eq!("SHA256".parse::<DigestAlgorithm>(), Err(Error::UnsupportedAlgorithm));
        assert_eq!("sha3-256".parse::<DigestAlgorithm>(), Err(Error::UnsupportedAlgorithm));
        assert_eq!("".parse::<DigestAlgorithm>(), Err(Error::UnsupportedAlgorithm));
    }

    #[test]
    fn test_oids_match_digest_crates() {
        assert_eq!(DigestAlgorithm::Sha1.oid(), sha1::Sha1::OID);
        assert_eq!(DigestAlgorithm::Sha256.oid(), sha2::Sha256::OID);
        assert_eq!(DigestAlgorithm::Sha512.oid(), sha2::Sha512::OID);
    }
}
