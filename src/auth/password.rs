use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 32;
const MIN_SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;
const SEPARATOR: char = ':';

/// Well-formed credential checked when the username is unknown, so a miss
/// costs the same derivation as a wrong password.
pub(crate) const DUMMY_CREDENTIAL: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f:eb6d5c8de5fcc850ba948186a654874cf3e56a683281c95efd24603a0e72908a";

fn derive(password: &str, salt: &[u8]) -> [u8; DIGEST_LEN] {
    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut digest);
    digest
}

/// Hashes a password with a fresh random salt.
/// Returns `<salt-hex>:<digest-hex>`.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let digest = derive(password, &salt);
    format!("{}{SEPARATOR}{}", hex::encode(salt), hex::encode(digest))
}

/// Parses a stored credential into (salt, digest).
fn parse_credential(credential: &str) -> Option<(Vec<u8>, Vec<u8>)> {
    let (salt_hex, digest_hex) = credential.split_once(SEPARATOR)?;
    if digest_hex.contains(SEPARATOR) {
        return None;
    }

    let salt = hex::decode(salt_hex).ok()?;
    let digest = hex::decode(digest_hex).ok()?;
    if salt.len() < MIN_SALT_LEN || digest.len() != DIGEST_LEN {
        return None;
    }
    Some((salt, digest))
}

/// Verifies a password attempt against a stored credential.
/// Malformed credentials never verify.
#[must_use]
pub fn verify_password(credential: &str, attempt: &str) -> bool {
    let Some((salt, expected)) = parse_credential(credential) else {
        return false;
    };
    let actual = derive(attempt, &salt);
    actual.as_slice().ct_eq(expected.as_slice()).into()
}
