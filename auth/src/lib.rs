//! Authentication primitives
//!
//! Transport-agnostic building blocks for account authentication:
//! - Password hashing (Argon2id, PBKDF2-SHA256 fallback) and password policy
//! - Signed identity tokens (JWT) with a closed error taxonomy
//! - Bearer credential parsing
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{HashingConfig, PasswordHasher};
//!
//! let hasher = PasswordHasher::new(HashingConfig::default()).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("my_password", "not-a-digest"));
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenService, TokenSettings};
//!
//! let tokens = TokenService::new(&TokenSettings::new("secret_key_at_least_32_bytes_long!"));
//! let issued = tokens.issue_access_token("user123").unwrap();
//! let claims = tokens.verify(&issued.access_token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! ```
//!
//! ## Bearer Credentials
//! ```
//! assert_eq!(auth::parse_bearer(Some("Bearer abc")), Some("abc"));
//! assert_eq!(auth::parse_bearer(None), None);
//! ```

pub mod authenticator;
pub mod bearer;
pub mod jwt;
pub mod password;

pub use authenticator::Authenticator;
pub use bearer::parse_bearer;
pub use jwt::Claims;
pub use jwt::Clock;
pub use jwt::FixedClock;
pub use jwt::SigningError;
pub use jwt::SystemClock;
pub use jwt::TokenError;
pub use jwt::TokenResponse;
pub use jwt::TokenService;
pub use jwt::TokenSettings;
pub use password::HashAlgorithm;
pub use password::HashingConfig;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordPolicy;
pub use password::PasswordPolicyViolation;
