pub mod authentication;
pub mod claims;
pub mod credentials;
pub mod factory;
pub mod token_codec;

pub use authentication::{AuthenticationService, IssuedToken, LoginError};
pub use claims::{Claim, ClaimName, ClaimSet, ClaimsPrincipal};
pub use factory::{AuthServices, build_auth_services};
pub use token_codec::{SigningKey, Token, TokenCodec, TokenError, TokenVerifier};
