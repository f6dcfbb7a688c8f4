//! Authentication: password hashing, session tokens, and the request gate

pub mod cookie;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod secret;

pub use error::AuthError;
pub use jwt::{Claims, TokenService};
pub use middleware::{extract_token, jwt_auth_middleware, AuthContext, AuthGate};
pub use password::PasswordHasher;
pub use secret::generate_secret;
