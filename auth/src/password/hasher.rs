use password_hash::rand_core::OsRng;
use password_hash::PasswordHash;
use password_hash::PasswordHasher as _;
use password_hash::PasswordVerifier;
use password_hash::SaltString;
use pbkdf2::Pbkdf2;
use serde::Deserialize;

use super::errors::PasswordError;

const PBKDF2_MIN_ROUNDS: u32 = 1_000;
const PBKDF2_OUTPUT_LENGTH: usize = 32;

/// Algorithm used for newly created password digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "argon2id")]
    Argon2id,
    #[serde(rename = "pbkdf2-sha256")]
    Pbkdf2Sha256,
}

impl HashAlgorithm {
    /// PHC identifier embedded in digests produced by this algorithm.
    pub fn ident(&self) -> &'static str {
        match self {
            HashAlgorithm::Argon2id => "argon2id",
            HashAlgorithm::Pbkdf2Sha256 => "pbkdf2-sha256",
        }
    }
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        if cfg!(feature = "argon2") {
            HashAlgorithm::Argon2id
        } else {
            HashAlgorithm::Pbkdf2Sha256
        }
    }
}

/// Cost parameters for password hashing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    pub algorithm: HashAlgorithm,
    /// Argon2 memory cost in KiB.
    pub memory_cost: u32,
    /// Argon2 iterations.
    pub time_cost: u32,
    /// Argon2 lanes.
    pub parallelism: u32,
    pub pbkdf2_rounds: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            memory_cost: 19_456,
            time_cost: 2,
            parallelism: 1,
            pbkdf2_rounds: 600_000,
        }
    }
}

/// Password hashing implementation.
///
/// Produces self-describing PHC digests (`$argon2id$...` or `$pbkdf2-sha256$...`)
/// and verifies any digest it recognizes, whatever the currently configured
/// algorithm is. Hashing is CPU-bound and slow on purpose; async callers should
/// run it on a blocking thread.
#[derive(Clone)]
pub struct PasswordHasher {
    config: HashingConfig,
    #[cfg(feature = "argon2")]
    argon2: argon2::Argon2<'static>,
}

impl PasswordHasher {
    /// Create a hasher with validated cost parameters.
    ///
    /// When built without the `argon2` feature, an `argon2id` configuration
    /// falls back to PBKDF2-SHA256.
    ///
    /// # Errors
    /// * `InvalidParameters` - Cost parameters are out of range
    pub fn new(config: HashingConfig) -> Result<Self, PasswordError> {
        if config.pbkdf2_rounds < PBKDF2_MIN_ROUNDS {
            return Err(PasswordError::InvalidParameters(format!(
                "pbkdf2_rounds must be at least {}, got {}",
                PBKDF2_MIN_ROUNDS, config.pbkdf2_rounds
            )));
        }

        #[cfg(feature = "argon2")]
        {
            let params = argon2::Params::new(
                config.memory_cost,
                config.time_cost,
                config.parallelism,
                None,
            )
            .map_err(|e| PasswordError::InvalidParameters(e.to_string()))?;

            let argon2 =
                argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

            Ok(Self { config, argon2 })
        }

        #[cfg(not(feature = "argon2"))]
        {
            let mut config = config;
            if config.algorithm == HashAlgorithm::Argon2id {
                tracing::warn!("Argon2 support not compiled in, hashing with pbkdf2-sha256");
                config.algorithm = HashAlgorithm::Pbkdf2Sha256;
            }
            Ok(Self { config })
        }
    }

    /// Algorithm used for new digests.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.config.algorithm
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.hash_with_salt(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    fn hash_with_salt<'a>(
        &self,
        password: &[u8],
        salt: &'a SaltString,
    ) -> password_hash::Result<PasswordHash<'a>> {
        #[cfg(feature = "argon2")]
        if self.config.algorithm == HashAlgorithm::Argon2id {
            return self.argon2.hash_password(password, salt);
        }

        Pbkdf2.hash_password_customized(
            password,
            Some(pbkdf2::Algorithm::Pbkdf2Sha256.ident()),
            None,
            pbkdf2::Params {
                rounds: self.config.pbkdf2_rounds,
                output_length: PBKDF2_OUTPUT_LENGTH,
            },
            salt,
        )
    }

    /// Verify a password against a stored digest.
    ///
    /// Dispatches on the algorithm named inside the digest. Fails closed:
    /// unparseable or unknown digests return `false`.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "Rejecting unparseable password digest");
                return false;
            }
        };

        let outcome = match parsed.algorithm.as_str() {
            #[cfg(feature = "argon2")]
            "argon2id" | "argon2i" | "argon2d" => {
                argon2::Argon2::default().verify_password(password.as_bytes(), &parsed)
            }
            "pbkdf2-sha256" | "pbkdf2-sha512" => Pbkdf2.verify_password(password.as_bytes(), &parsed),
            other => {
                tracing::debug!(algorithm = other, "Unrecognized password digest algorithm");
                return false;
            }
        };

        match outcome {
            Ok(()) => true,
            Err(password_hash::Error::Password) => false,
            Err(e) => {
                tracing::debug!(error = %e, "Password digest verification error");
                false
            }
        }
    }

    /// Whether a digest should be replaced by one produced with the current settings.
    ///
    /// True for digests of another algorithm, with other cost parameters, or
    /// that cannot be parsed.
    pub fn needs_rehash(&self, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return true;
        };

        if parsed.algorithm.as_str() != self.config.algorithm.ident() {
            return true;
        }

        match self.config.algorithm {
            HashAlgorithm::Argon2id => {
                parsed.version != Some(0x13)
                    || parsed.params.get_decimal("m") != Some(self.config.memory_cost)
                    || parsed.params.get_decimal("t") != Some(self.config.time_cost)
                    || parsed.params.get_decimal("p") != Some(self.config.parallelism)
            }
            HashAlgorithm::Pbkdf2Sha256 => {
                parsed.params.get_decimal("i") != Some(self.config.pbkdf2_rounds)
            }
        }
    }
}
