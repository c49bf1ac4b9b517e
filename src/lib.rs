#![cfg_attr(not(test), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc(html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo_small.png")]
#![warn(missing_docs)]

//! RSA key-material engine.
//!
//! Keys travel through this crate as [`RsaKeyMaterial`]: eight big-endian
//! byte buffers (`n, e, d, p, q, dp, dq, qinv`) where an empty buffer marks an
//! absent component. The crate checks those buffers against the structural
//! RSA invariants, derives missing components, encodes them, and runs the
//! usual operations on them.
//!
//! # Usage
//!
//! ## Key material
//!
//! ```
//! use rsa_keymat::RsaKeyMaterial;
//!
//! let mut rng = rand::thread_rng(); // rand@0.8
//!
//! let key = rsa_keymat::generate(&mut rng, 1024, 65537).expect("failed to generate a key");
//! assert!(key.is_valid_private());
//! assert!(key.verify_consistency());
//!
//! // Drop everything but the primes and the public exponent, then derive the rest.
//! let mut partial = RsaKeyMaterial::default();
//! partial.p = key.p.clone();
//! partial.q = key.q.clone();
//! partial.e = key.e.clone();
//! assert!(partial.needs_completion());
//!
//! let completed = partial.complete(&mut rng).unwrap().expect("key was incomplete");
//! assert!(completed.verify_consistency());
//! assert_eq!(completed.n, key.n);
//! ```
//!
//! ## Signatures and encryption over key material
//!
//! ```
//! use rsa_keymat::EncryptionScheme;
//!
//! let mut rng = rand::thread_rng(); // rand@0.8
//!
//! let key = rsa_keymat::generate(&mut rng, 1024, 65537).expect("failed to generate a key");
//! let public = key.to_public();
//!
//! // Sign a precomputed SHA-256 digest
//! let digest = [0x5a; 32];
//! let signature = rsa_keymat::sign(&mut rng, "sha256", &digest, &key).expect("failed to sign");
//! assert!(rsa_keymat::verify("sha256", &digest, &signature, &public));
//!
//! // Encrypt and decrypt
//! let data = b"hello world";
//! let enc_data = rsa_keymat::encrypt(&mut rng, EncryptionScheme::Oaep, data, &public)
//!     .expect("failed to encrypt");
//! let dec_data = rsa_keymat::decrypt(&mut rng, EncryptionScheme::Oaep, &enc_data, &key)
//!     .expect("failed to decrypt");
//! assert_eq!(&data[..], &dec_data[..]);
//! ```
//!
//! ## OAEP encryption
//!
//! ```
//! use rsa_keymat::{RsaPrivateKey, RsaPublicKey, Oaep};
//! use sha2::Sha256;
//!
//! let mut rng = rand::thread_rng(); // rand@0.8
//!
//! let private_key = RsaPrivateKey::new_with_exp(&mut rng, 1024, 65537).expect("failed to generate a key");
//! let public_key = RsaPublicKey::from(&private_key);
//!
//! // Encrypt
//! let data = b"hello world";
//! let padding = Oaep::new::<Sha256>();
//! let enc_data = public_key.encrypt(&mut rng, padding, &data[..]).expect("failed to encrypt");
//! assert_ne!(&data[..], &enc_data[..]);
//!
//! // Decrypt
//! let padding = Oaep::new::<Sha256>();
//! let dec_data = private_key.decrypt_blinded(&mut rng, padding, &enc_data).expect("failed to decrypt");
//! assert_eq!(&data[..], &dec_data[..]);
//! ```
//!
//! ## PKCS#1 v1.5 signatures
//!
//! ```
//! use rsa_keymat::{DigestAlgorithm, RsaKeyMaterial};
//! use rsa_keymat::pkcs1v15::SigningKey;
//! use rsa_keymat::signature::{hazmat::{PrehashVerifier, RandomizedPrehashSigner}, Keypair};
//! use sha2::{Digest, Sha256};
//!
//! let mut rng = rand::thread_rng(); // rand@0.8
//!
//! let material = rsa_keymat::generate(&mut rng, 1024, 65537).expect("failed to generate a key");
//! let signing_key = SigningKey::from_material(&material, DigestAlgorithm::Sha256).expect("invalid key");
//! let verifying_key = signing_key.verifying_key();
//!
//! // Sign
//! let digest = Sha256::digest(b"hello world");
//! let signature = signing_key.sign_prehash_with_rng(&mut rng, &digest).expect("failed to sign");
//! assert_eq!(signature.as_ref().len(), material.modulus_len());
//!
//! // Verify
//! verifying_key.verify_prehash(&digest, &signature).expect("failed to verify");
//! ```
//!
//! ## PKCS#1 RSA Key Encoding
//!
//! [`RsaKeyMaterial`] encodes to and from the PKCS#1 `RSAPrivateKey` and
//! `RSAPublicKey` structures, as DER or (with the `pem` feature) PEM with the
//! `RSA PRIVATE KEY` / `RSA PUBLIC KEY` labels.
//!
//! ```
//! # #[cfg(feature = "pem")]
//! # {
//! use rsa_keymat::RsaKeyMaterial;
//!
//! let pem = "-----BEGIN RSA PUBLIC KEY-----
//! MIIBCgKCAQEAtsQsUV8QpqrygsY+2+JCQ6Fw8/omM71IM2N/R8pPbzbgOl0p78MZ
//! GsgPOQ2HSznjD0FPzsH8oO2B5Uftws04LHb2HJAYlz25+lN5cqfHAfa3fgmC38Ff
//! wBkn7l582UtPWZ/wcBOnyCgb3yLcvJrXyrt8QxHJgvWO23ITrUVYszImbXQ67YGS
//! 0YhMrbixRzmo2tpm3JcIBtnHrEUMsT0NfFdfsZhTT8YbxBvA8FdODgEwx7u/vf3J
//! 9qbi4+Kv8cvqyJuleIRSjVXPsIMnoejIn04APPKIjpMyQdnWlby7rNyQtE4+CV+j
//! cFjqJbE/Xilcvqxt6DirjFCvYeKYl1uHLwIDAQAB
//! -----END RSA PUBLIC KEY-----";
//!
//! let public_key = RsaKeyMaterial::from_public_pkcs1_pem(pem).unwrap();
//! assert!(public_key.is_valid_public());
//! assert_eq!(public_key.modulus_bits(), 2048);
//! # }
//! ```
//!
//! ## PKCS#8 RSA Key Encoding
//!
//! The transient [`RsaPrivateKey`] and [`RsaPublicKey`] types implement the
//! [`pkcs8`] traits, so the `PRIVATE KEY` and `PUBLIC KEY` formats go through
//! them:
//!
//! - [`pkcs8::DecodePrivateKey`]: decode private keys from PKCS#8
//! - [`pkcs8::EncodePrivateKey`]: encode private keys to PKCS#8
//! - [`pkcs8::DecodePublicKey`]: decode public keys from PKCS#8
//! - [`pkcs8::EncodePublicKey`]: encode public keys to PKCS#8
//!
//! [`pkcs8::DecodePublicKey`]: https://docs.rs/pkcs8/latest/pkcs8/trait.DecodePublicKey.html
//! [`pkcs8::EncodePublicKey`]: https://docs.rs/pkcs8/latest/pkcs8/trait.EncodePublicKey.html

#[macro_use]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub use num_bigint::BigUint;
pub use rand_core;
pub use signature;

mod algorithms;
pub mod engine;
pub mod errors;
pub mod hash;
pub mod material;
pub mod oaep;
pub mod pkcs1v15;
pub mod traits;

mod encoding;
mod key;

pub use pkcs1;
pub use pkcs8;

pub use crate::{
    engine::{decrypt, encrypt, generate, sign, verify, EncryptionScheme},
    errors::{Error, Result},
    hash::DigestAlgorithm,
    key::{RsaPrivateKey, RsaPublicKey},
    material::{bit_length, RsaKeyMaterial},
    oaep::Oaep,
    pkcs1v15::{Pkcs1v15Encrypt, Pkcs1v15Sign},
};

#[cfg(feature = "hazmat")]
pub mod hazmat;
