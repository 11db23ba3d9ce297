//! PBKDF2-HMAC-SHA256 password hashing.
//!
//! Stored format: `pbkdf2_sha256$<rounds>$<salt hex>$<hash hex>`.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

const ALGORITHM: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

pub const DEFAULT_ROUNDS: u32 = 100_000;

pub fn hash_password(password: &str) -> String {
    hash_with_rounds(password, DEFAULT_ROUNDS)
}

pub(crate) fn hash_with_rounds(password: &str, rounds: u32) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let hash = derive(password, &salt, rounds);
    format!("{}${}${}${}", ALGORITHM, rounds, hex::encode(salt), hex::encode(hash))
}

fn derive(password: &str, salt: &[u8], rounds: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut out);
    out
}
