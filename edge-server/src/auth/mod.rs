//! Authentication and authorization: JWT issuance/validation, the coarse
//! permission matrix, and the axum extractor/middleware that enforce both.

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod permissions;
pub mod service;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{CurrentUserExt, require_auth, require_permission};
pub use permissions::Permission;
pub use service::{AuthService, LoginResponse};
