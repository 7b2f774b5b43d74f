use pbkdf2::pbkdf2_hmac_array;
use rand::Rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// PBKDF2-HMAC-SHA256 iteration count. Fixed so verification can always
/// recompute the derived key for hashes produced by any release.
const PBKDF2_ROUNDS: u32 = 100_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Errors reading a stored hash. These mean the record is corrupt, not that
/// the supplied password was wrong.
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("stored password hash is missing its salt delimiter")]
    MissingDelimiter,

    #[error("stored password hash is not valid hex")]
    Encoding(#[from] hex::FromHexError),
}

/// Newtype for plaintext passwords so they stay out of logs.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: String) -> Self {
        Self(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Hash a password with a fresh random salt.
///
/// The stored form is `hex(salt) + "." + hex(derived_key)`, so the salt
/// travels with the hash and verification needs no extra state.
pub fn hash_password(password: &Password) -> String {
    let salt: [u8; SALT_LEN] = rand::thread_rng().gen();
    let key =
        pbkdf2_hmac_array::<Sha256, KEY_LEN>(password.as_str().as_bytes(), &salt, PBKDF2_ROUNDS);
    format!("{}.{}", hex::encode(salt), hex::encode(key))
}

/// Recompute the derived key with the stored salt and compare in constant
/// time. `Ok(false)` is a credential mismatch; `Err` means the stored hash is
/// corrupt.
pub fn verify_password(password: &Password, stored: &str) -> Result<bool, PasswordHashError> {
    let (salt_hex, key_hex) = stored
        .split_once('.')
        .ok_or(PasswordHashError::MissingDelimiter)?;
    if salt_hex.is_empty() || key_hex.is_empty() {
        return Err(PasswordHashError::MissingDelimiter);
    }

    let salt = hex::decode(salt_hex)?;
    let expected = hex::decode(key_hex)?;
    let derived =
        pbkdf2_hmac_array::<Sha256, KEY_LEN>(password.as_str().as_bytes(), &salt, PBKDF2_ROUNDS);

    Ok(derived.as_slice().ct_eq(expected.as_slice()).into())
}
