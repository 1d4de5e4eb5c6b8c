pub mod claims;
pub mod clock;
pub mod errors;
pub mod service;

pub use claims::Claims;
pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use errors::SigningError;
pub use errors::TokenError;
pub use service::TokenResponse;
pub use service::TokenService;
pub use service::TokenSettings;
pub use service::TOKEN_TYPE_BEARER;
