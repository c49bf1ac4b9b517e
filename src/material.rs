//! Caller-facing RSA key material: eight big-endian byte buffers plus the
//! structural checks, completion and arena layout that operate on them.

use alloc::vec::Vec;
use core::fmt;
use num_bigint::BigUint;
use rand_core::CryptoRngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::algorithms::generate::{MAX_MODULUS_BITS, MIN_MODULUS_BITS};
use crate::algorithms::rsa::{compute_modulus, compute_totient, ConstTime};
use crate::errors::{Error, Result};
use crate::key::RsaPrivateKey;

/// Smallest public exponent size, in bits.
const MIN_EXPONENT_BITS: usize = 2;

/// Largest public exponent size, in bits.
const MAX_EXPONENT_BITS: usize = 33;

/// Number of components in a private key.
const FIELD_COUNT: usize = 8;

/// Size of the arena header: one big-endian `u32` length per component.
pub const ARENA_HEADER_LEN: usize = FIELD_COUNT * 4;

/// Returns the number of significant bits in a big-endian buffer.
///
/// Leading zero bytes are ignored; an empty or all-zero buffer has length 0.
pub fn bit_length(buf: &[u8]) -> usize {
    match buf.iter().position(|&b| b != 0) {
        Some(i) => (buf.len() - i) * 8 - buf[i].leading_zeros() as usize,
        None => 0,
    }
}

fn is_odd(buf: &[u8]) -> bool {
    buf.last().map_or(false, |b| b & 1 == 1)
}

fn modulus_bits_in_range(bits: usize) -> bool {
    (MIN_MODULUS_BITS..=MAX_MODULUS_BITS).contains(&bits)
}

fn exponent_in_range(e: &[u8]) -> bool {
    (MIN_EXPONENT_BITS..=MAX_EXPONENT_BITS).contains(&bit_length(e)) && is_odd(e)
}

fn to_bytes(n: &BigUint) -> Vec<u8> {
    n.to_bytes_be()
}

/// RSA key components as big-endian byte buffers.
///
/// An empty buffer marks an absent component. A public key only carries
/// `n` and `e`; a complete private key carries all eight. Every buffer is
/// wiped when the value is dropped.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RsaKeyMaterial {
    /// Modulus
    #[cfg_attr(feature = "serde", serde(with = "hex_or_bin"))]
    pub n: Vec<u8>,
    /// Public exponent
    #[cfg_attr(feature = "serde", serde(with = "hex_or_bin"))]
    pub e: Vec<u8>,
    /// Private exponent
    #[cfg_attr(feature = "serde", serde(with = "hex_or_bin", default))]
    pub d: Vec<u8>,
    /// First prime factor
    #[cfg_attr(feature = "serde", serde(with = "hex_or_bin", default))]
    pub p: Vec<u8>,
    /// Second prime factor
    #[cfg_attr(feature = "serde", serde(with = "hex_or_bin", default))]
    pub q: Vec<u8>,
    /// D mod (P-1)
    #[cfg_attr(feature = "serde", serde(with = "hex_or_bin", default))]
    pub dp: Vec<u8>,
    /// D mod (Q-1)
    #[cfg_attr(feature = "serde", serde(with = "hex_or_bin", default))]
    pub dq: Vec<u8>,
    /// Q^-1 mod P
    #[cfg_attr(feature = "serde", serde(with = "hex_or_bin", default))]
    pub qinv: Vec<u8>,
}

impl RsaKeyMaterial {
    /// Public key material from a modulus and exponent.
    pub fn public(n: impl Into<Vec<u8>>, e: impl Into<Vec<u8>>) -> Self {
        let mut out = Self::default();
        out.n = n.into();
        out.e = e.into();
        out
    }

    /// Private key material from all eight components, in `RSAPrivateKey` order.
    #[allow(clippy::too_many_arguments)]
    pub fn private(
        n: impl Into<Vec<u8>>,
        e: impl Into<Vec<u8>>,
        d: impl Into<Vec<u8>>,
        p: impl Into<Vec<u8>>,
        q: impl Into<Vec<u8>>,
        dp: impl Into<Vec<u8>>,
        dq: impl Into<Vec<u8>>,
        qinv: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            n: n.into(),
            e: e.into(),
            d: d.into(),
            p: p.into(),
            q: q.into(),
            dp: dp.into(),
            dq: dq.into(),
            qinv: qinv.into(),
        }
    }

    fn fields(&self) -> [&Vec<u8>; FIELD_COUNT] {
        [
            &self.n, &self.e, &self.d, &self.p, &self.q, &self.dp, &self.dq, &self.qinv,
        ]
    }

    fn fields_mut(&mut self) -> [&mut Vec<u8>; FIELD_COUNT] {
        [
            &mut self.n,
            &mut self.e,
            &mut self.d,
            &mut self.p,
            &mut self.q,
            &mut self.dp,
            &mut self.dq,
            &mut self.qinv,
        ]
    }

    /// Returns the size of the modulus in bits.
    pub fn modulus_bits(&self) -> usize {
        bit_length(&self.n)
    }

    /// Returns the size of the modulus in bytes, which is also the size of
    /// signatures and ciphertexts produced with this key.
    pub fn modulus_len(&self) -> usize {
        (self.modulus_bits() + 7) / 8
    }

    /// Checks the modulus and public exponent bounds.
    pub fn is_valid_public(&self) -> bool {
        modulus_bits_in_range(bit_length(&self.n)) && exponent_in_range(&self.e)
    }

    /// Checks the public bounds plus the bit-length relations between the
    /// private components.
    ///
    /// This is a structural check only. Use [`RsaKeyMaterial::verify_consistency`]
    /// to confirm the components actually form an RSA key.
    pub fn is_valid_private(&self) -> bool {
        if !self.is_valid_public() {
            return false;
        }

        let nb = bit_length(&self.n);
        let db = bit_length(&self.d);
        if db == 0 || db > nb {
            return false;
        }

        let pb = bit_length(&self.p);
        let qb = bit_length(&self.q);
        if pb + qb != nb {
            return false;
        }

        let dpb = bit_length(&self.dp);
        if dpb == 0 || dpb > pb {
            return false;
        }

        let dqb = bit_length(&self.dq);
        if dqb == 0 || dqb > qb {
            return false;
        }

        let qib = bit_length(&self.qinv);
        qib != 0 && qib <= pb
    }

    /// Checks whether [`RsaKeyMaterial::complete`] may run on this material.
    ///
    /// Both primes are required along with at least one of the exponents;
    /// every other component is optional but bounded when present.
    pub fn is_valid_for_completion(&self) -> bool {
        let nb = bit_length(&self.n);
        let eb = bit_length(&self.e);
        let db = bit_length(&self.d);
        let pb = bit_length(&self.p);
        let qb = bit_length(&self.q);

        if pb == 0 || qb == 0 {
            return false;
        }

        if eb == 0 && db == 0 {
            return false;
        }

        if nb != 0 && (!modulus_bits_in_range(nb) || pb + qb != nb) {
            return false;
        }

        if eb != 0 && !exponent_in_range(&self.e) {
            return false;
        }

        if db > pb + qb {
            return false;
        }

        bit_length(&self.dp) <= pb && bit_length(&self.dq) <= qb && bit_length(&self.qinv) <= pb
    }

    /// Returns `true` if any of `n`, `e`, `d`, `dp`, `dq` or `qinv` is absent.
    pub fn needs_completion(&self) -> bool {
        [&self.n, &self.e, &self.d, &self.dp, &self.dq, &self.qinv]
            .iter()
            .any(|f| bit_length(f) == 0)
    }

    /// Derives every absent component from the primes and the exponent that
    /// is present.
    ///
    /// Returns `Ok(None)` when nothing is missing. Otherwise returns the
    /// completed key: derived components are freshly computed, present ones
    /// are copied verbatim. `self` is never modified, so a failure leaves no
    /// trace. A supplied `e` is not cross-checked against a supplied `d`.
    ///
    /// Secret-dependent inversions and reductions run in constant-time mode,
    /// which draws masking values from `rng`.
    pub fn complete<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> Result<Option<Self>> {
        if !self.is_valid_for_completion() {
            return Err(Error::InvalidKeyMaterial);
        }

        if !self.needs_completion() {
            return Ok(None);
        }

        let p = Zeroizing::new(BigUint::from_bytes_be(&self.p));
        let q = Zeroizing::new(BigUint::from_bytes_be(&self.q));

        let mut out = self.clone();

        if bit_length(&self.n) == 0 {
            out.n = to_bytes(&compute_modulus(&p, &q));
        }

        let (r1, r2, totient) = compute_totient(&p, &q)?;
        let mut ct = ConstTime::new(rng);

        let e = if bit_length(&self.e) == 0 {
            let d = Zeroizing::new(BigUint::from_bytes_be(&self.d));
            let e = ct.mod_inverse(&d, &totient)?;
            out.e = to_bytes(&e);
            e
        } else {
            BigUint::from_bytes_be(&self.e)
        };

        let d = if bit_length(&self.d) == 0 {
            let d = Zeroizing::new(ct.mod_inverse(&e, &totient)?);
            out.d = to_bytes(&d);
            d
        } else {
            Zeroizing::new(BigUint::from_bytes_be(&self.d))
        };

        if bit_length(&self.dp) == 0 {
            let dp = Zeroizing::new(ct.reduce(&d, &r1)?);
            out.dp = to_bytes(&dp);
        }

        if bit_length(&self.dq) == 0 {
            let dq = Zeroizing::new(ct.reduce(&d, &r2)?);
            out.dq = to_bytes(&dq);
        }

        if bit_length(&self.qinv) == 0 {
            let qinv = Zeroizing::new(ct.mod_inverse(&q, &p)?);
            out.qinv = to_bytes(&qinv);
        }

        Ok(Some(out))
    }

    /// Copies into `self` every component that is absent here and present in
    /// `other`. Components already present are kept.
    pub fn merge_missing(&mut self, other: &Self) {
        for (dst, src) in self.fields_mut().into_iter().zip(other.fields()) {
            if bit_length(dst) == 0 && bit_length(src) != 0 {
                dst.zeroize();
                dst.extend_from_slice(src);
            }
        }
    }

    /// Returns the public half of this key.
    pub fn to_public(&self) -> Self {
        Self::public(self.n.clone(), self.e.clone())
    }

    /// Runs the full consistency check on a private key: the structural
    /// checks, primality of `p` and `q`, `p * q == n`, `e * d ≡ 1` modulo
    /// `p - 1` and `q - 1`, and the CRT values.
    pub fn verify_consistency(&self) -> bool {
        if !self.is_valid_private() {
            return false;
        }

        RsaPrivateKey::try_from(self)
            .and_then(|key| key.validate())
            .is_ok()
    }

    /// Lays the components out contiguously after a fixed header of eight
    /// big-endian `u32` lengths, in the order `n, e, d, p, q, dp, dq, qinv`.
    ///
    /// Absent components have length zero, so a public key is its header
    /// followed by `n` and `e` only.
    pub fn to_arena(&self) -> Result<Zeroizing<Vec<u8>>> {
        let payload_len: usize = self.fields().iter().map(|f| f.len()).sum();
        let mut out = Zeroizing::new(Vec::with_capacity(ARENA_HEADER_LEN + payload_len));

        for field in self.fields() {
            let len = u32::try_from(field.len()).map_err(|_| Error::MalformedEncoding)?;
            out.extend_from_slice(&len.to_be_bytes());
        }

        for field in self.fields() {
            out.extend_from_slice(field);
        }

        Ok(out)
    }

    /// Parses the layout produced by [`RsaKeyMaterial::to_arena`].
    ///
    /// Truncated input, lengths running past the end and trailing bytes are
    /// rejected.
    pub fn from_arena(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < ARENA_HEADER_LEN {
            return Err(Error::MalformedEncoding);
        }

        let (header, mut payload) = bytes.split_at(ARENA_HEADER_LEN);
        let mut out = Self::default();

        for (field, len) in out.fields_mut().into_iter().zip(header.chunks_exact(4)) {
            let len = u32::from_be_bytes([len[0], len[1], len[2], len[3]]) as usize;
            if len > payload.len() {
                return Err(Error::MalformedEncoding);
            }

            let (head, rest) = payload.split_at(len);
            field.extend_from_slice(head);
            payload = rest;
        }

        if !payload.is_empty() {
            return Err(Error::MalformedEncoding);
        }

        Ok(out)
    }
}

fn strip_leading_zeros(buf: &[u8]) -> &[u8] {
    let start = buf.iter().position(|&b| b != 0).unwrap_or(buf.len());
    &buf[start..]
}

/// Components compare as integers, so leading zero bytes do not matter.
impl PartialEq for RsaKeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.fields()
            .iter()
            .zip(other.fields().iter())
            .all(|(a, b)| strip_leading_zeros(a) == strip_leading_zeros(b))
    }
}

impl Eq for RsaKeyMaterial {}

impl fmt::Debug for RsaKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeyMaterial")
            .field("n_bits", &bit_length(&self.n))
            .field("e_bits", &bit_length(&self.e))
            .field("d_bits", &bit_length(&self.d))
            .field("p_bits", &bit_length(&self.p))
            .field("q_bits", &bit_length(&self.q))
            .field("dp_bits", &bit_length(&self.dp))
            .field("dq_bits", &bit_length(&self.dq))
            .field("qinv_bits", &bit_length(&self.qinv))
            .finish()
    }
}

impl Zeroize for RsaKeyMaterial {
    fn zeroize(&mut self) {
        for field in self.fields_mut() {
            field.zeroize();
        }
    }
}

impl Drop for RsaKeyMaterial {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for RsaKeyMaterial {}

#[cfg(feature = "serde")]
mod hex_or_bin {
    use alloc::vec::Vec;
    use serde::{Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
        serdect::slice::serialize_hex_lower_or_bin(value, serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        serdect::slice::deserialize_hex_or_bin_vec(deserializer)
    }
}
