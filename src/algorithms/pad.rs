//! Fixed-width big-endian encoding of integers.

use alloc::vec::Vec;
use num_bigint::BigUint;
use zeroize::Zeroizing;

use crate::errors::{Error, Result};

/// Copies `input` into the tail of `out`, leaving leading zeros.
#[inline]
fn left_pad_into(input: &[u8], out: &mut [u8]) -> Result<()> {
    let padded_len = out.len();
    if input.len() > padded_len {
        return Err(Error::PrimitiveFailure);
    }

    out[padded_len - input.len()..].copy_from_slice(input);
    Ok(())
}

/// Encodes `input` big-endian into exactly `padded_len` bytes.
#[inline]
pub(crate) fn uint_to_be_pad(input: BigUint, padded_len: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; padded_len];
    left_pad_into(&input.to_bytes_be(), &mut out)?;
    Ok(out)
}

/// Same as [`uint_to_be_pad`] for secret values: every intermediate buffer is
/// wiped on drop.
#[inline]
pub(crate) fn uint_to_zeroizing_be_pad(
    input: BigUint,
    padded_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let m = Zeroizing::new(input);
    let m = Zeroizing::new(m.to_bytes_be());
    let mut out = Zeroizing::new(vec![0u8; padded_len]);
    left_pad_into(&m, &mut out)?;
    Ok(out)
}
