//! Error types.

/// Alias for [`core::result::Result`] with the `rsa-keymat` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types
#[derive(Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Key material violates a structural or bit-length invariant.
    InvalidKeyMaterial,

    /// Digest or encryption scheme name is not recognized.
    UnsupportedAlgorithm,

    /// Message or digest length is outside the accepted range.
    InvalidMessageLength,

    /// Plaintext does not fit the modulus for the selected scheme.
    PlaintextTooLong,

    /// Encoded key is not well-formed.
    MalformedEncoding,

    /// A required modular inverse does not exist.
    KeyCompletionFailed,

    /// The big-integer substrate failed to produce a result.
    PrimitiveFailure,

    /// Decryption error.
    Decryption,

    /// Verification error.
    Verification,
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidKeyMaterial => write!(f, "invalid key material"),
            Error::UnsupportedAlgorithm => write!(f, "unsupported algorithm"),
            Error::InvalidMessageLength => write!(f, "invalid message length"),
            Error::PlaintextTooLong => write!(f, "plaintext too long"),
            Error::MalformedEncoding => write!(f, "malformed key encoding"),
            Error::KeyCompletionFailed => write!(f, "key completion failed"),
            Error::PrimitiveFailure => write!(f, "primitive operation failed"),
            Error::Decryption => write!(f, "decryption error"),
            Error::Verification => write!(f, "verification error"),
        }
    }
}

impl From<pkcs1::Error> for Error {
    fn from(_err: pkcs1::Error) -> Error {
        Error::MalformedEncoding
    }
}

impl From<pkcs8::Error> for Error {
    fn from(_err: pkcs8::Error) -> Error {
        Error::MalformedEncoding
    }
}

impl From<pkcs8::spki::Error> for Error {
    fn from(_err: pkcs8::spki::Error) -> Error {
        Error::MalformedEncoding
    }
}

impl From<pkcs1::der::Error> for Error {
    fn from(_err: pkcs1::der::Error) -> Error {
        Error::MalformedEncoding
    }
}

impl From<Error> for signature::Error {
    fn from(err: Error) -> Self {
        #[cfg(feature = "std")]
        {
            signature::Error::from_source(err)
        }
        #[cfg(not(feature = "std"))]
        {
            let _ = err;
            signature::Error::new()
        }
    }
}
