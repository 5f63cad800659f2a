pub mod access_jwt;
pub mod factory;
pub mod password;
pub mod refresh_token;
pub mod token_service;

pub use access_jwt::{AccessJwtError, AccessTokenService, VerifiedAccessToken};
pub use factory::build_token_service;
pub use refresh_token::RefreshTokenService;
pub use token_service::{IssuedTokenPair, TokenService};
