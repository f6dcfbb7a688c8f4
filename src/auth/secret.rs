//! Signing secret generation for `--generate-secret`

use argon2::password_hash::rand_core::{OsRng, RngCore};

/// Random bytes behind a generated secret
pub const SECRET_BYTES: usize = 32;

/// Generate a hex-encoded signing secret from the OS random source
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
