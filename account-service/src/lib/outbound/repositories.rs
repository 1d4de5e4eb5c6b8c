//! Account persistence backends.
//!
//! Both implement [`AccountRepository`](crate::account::ports::AccountRepository)
//! with identical semantics; the server picks Postgres when a database URL is
//! configured and the in-memory store otherwise.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAccountRepository;
pub use postgres::PostgresAccountRepository;
