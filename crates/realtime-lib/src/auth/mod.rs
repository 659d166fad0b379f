// ============================
// crates/realtime-lib/src/auth/mod.rs
// ============================
//! Authentication module.

mod gate;
mod token;

pub use gate::AuthGate;
pub use token::{bearer_token, Claims, TokenIssuer, TokenVerifier};
