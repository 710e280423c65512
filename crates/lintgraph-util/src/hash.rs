use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash over an ordered sequence of parts, returning a
/// lowercase hex string.
///
/// Parts are fed to the hasher back to back, so the result equals the hash
/// of their concatenation. Callers that need unambiguous boundaries must put
/// them into the parts themselves.
pub fn sha256_parts<I, P>(parts: I) -> String
where
    I: IntoIterator<Item = P>,
    P: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_ref());
    }
    format!("{:x}", hasher.finalize())
}

