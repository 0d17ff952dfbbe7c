//! Auth domain - verifies identity provider tokens
//!
//! Token issuance belongs to the identity provider; this service only checks
//! signatures and expiry, then hands the identity to the profiles domain.

pub mod jwt;

pub use jwt::{Claims, JwtService};
