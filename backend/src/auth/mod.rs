//! Authentication module: user registration, password checks, token
//! issuance and the administrator query.
//!
//! The service logic lives in [`service`]; [`handlers`] and [`routes`] expose
//! it over HTTP.

pub mod errors;
pub mod handlers;
pub mod jwt;
pub mod models;
pub mod password;
pub mod routes;
pub mod service;

// Re-exports for convenience
pub use errors::{AuthError, Missing};
pub use jwt::TokenIssuer;
pub use models::*;
pub use password::PasswordHasher;
pub use routes::auth_router;
pub use service::AuthService;
