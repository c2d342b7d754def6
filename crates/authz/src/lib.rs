//! Bearer-token authentication: signed token issuing and the request gate
//! that guards protected routes.

pub mod error;
pub mod gate;
pub mod token;

pub use error::AuthError;
pub use gate::{authenticate, require_bearer, Identity};
pub use token::{Claims, IssuedToken, TokenService};
