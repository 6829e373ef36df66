pub mod factory;
pub mod jwt;
pub mod token;

pub use factory::{build_admin_overrides, build_verifier};
pub use jwt::{JwtVerifier, KeyError};
pub use token::{Claims, Token, TokenCheck, TokenResult, Verifier, VerifyError, verify_credential};
