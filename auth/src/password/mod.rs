pub mod errors;
pub mod hasher;
pub mod policy;

pub use errors::PasswordError;
pub use errors::PasswordPolicyViolation;
pub use hasher::HashAlgorithm;
pub use hasher::HashingConfig;
pub use hasher::PasswordHasher;
pub use policy::PasswordPolicy;
