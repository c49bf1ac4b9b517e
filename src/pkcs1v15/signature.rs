use ::signature::SignatureEncoding;

use alloc::{boxed::Box, vec::Vec};
use core::fmt;

use crate::engine::MAX_SIGNATURE_LEN;

/// An `RSASSA-PKCS1-v1_5` signature, as long as the modulus that produced it.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(Box<[u8]>);

impl Signature {
    pub(super) fn new(bytes: Vec<u8>) -> Self {
        Self(bytes.into_boxed_slice())
    }
}

impl SignatureEncoding for Signature {
    type Repr = Box<[u8]>;
}

/// Accepts between 1 and [`MAX_SIGNATURE_LEN`] bytes. Whether the length
/// matches a modulus is only known once a key is involved.
impl TryFrom<&[u8]> for Signature {
    type Error = ::signature::Error;

    fn try_from(bytes: &[u8]) -> ::signature::Result<Self> {
        if bytes.is_empty() || bytes.len() > MAX_SIGNATURE_LEN {
            return Err(::signature::Error::new());
        }
        Ok(Self(bytes.into()))
    }
}

impl From<Signature> for Box<[u8]> {
    fn from(sig: Signature) -> Box<[u8]> {
        sig.0
    }
}

impl From<Signature> for Vec<u8> {
    fn from(sig: Signature) -> Vec<u8> {
        sig.0.into_vec()
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::LowerHex for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{:02x}", b))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:x})", self)
    }
}
