use std::str::FromStr;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use serde::Deserialize;
use tracing::{error, warn};

/// How the `password` column is written and compared.
///
/// `Plaintext` keeps the value verbatim and compares byte for byte; it is the
/// default so existing databases keep working. `Argon2` stores a salted PHC
/// string instead. Both give the same login contract: success iff the
/// submitted password is the one chosen at registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    #[default]
    Plaintext,
    Argon2,
}

impl FromStr for PasswordScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaintext" | "plain" => Ok(Self::Plaintext),
            "argon2" => Ok(Self::Argon2),
            other => anyhow::bail!("unknown PASSWORD_SCHEME {other:?}"),
        }
    }
}

impl PasswordScheme {
    /// Value to persist for a freshly registered password.
    pub fn store(&self, plain: &str) -> anyhow::Result<String> {
        match self {
            Self::Plaintext => Ok(plain.to_string()),
            Self::Argon2 => hash_password(plain),
        }
    }

    pub fn matches(&self, plain: &str, stored: &str) -> bool {
        match self {
            Self::Plaintext => plain == stored,
            Self::Argon2 => match verify_password(plain, stored) {
                Ok(ok) => ok,
                Err(e) => {
                    warn!(error = %e, "stored password is not an argon2 hash");
                    false
                }
            },
        }
    }
}

fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
