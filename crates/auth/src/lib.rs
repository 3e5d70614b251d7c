//! `dealwatch-auth`: optional bearer-token identity.
//!
//! Decoupled from HTTP and storage: callers hand in a token string and get
//! back verified claims or a reason the token was refused.

pub mod claims;
pub mod validator;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use validator::{Hs256JwtValidator, JwtValidator};
