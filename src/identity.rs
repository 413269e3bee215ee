use sha2::{Digest, Sha256};

/// Stable numeric id for an upstream code or name.
///
/// Takes the first eight bytes of the SHA-256 digest and clears the sign
/// bit so the value fits an SQLite INTEGER as a non-negative number.
/// Collisions are assumed away for the small league/team universe.
pub fn external_id(key: &str) -> i64 {
    let digest = Sha256::digest(key.as_bytes());
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(buf) & (i64::MAX as u64)) as i64
}

pub fn fixture_external_id(date: &str, home: &str, away: &str) -> i64 {
    external_id(&format!("{date}_{home}_{away}"))
}
