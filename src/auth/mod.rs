pub mod session;

pub use session::{bearer, AuthSession, TokenSession};
