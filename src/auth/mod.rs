//! Authentication: credential hashing, claim sets, token codec and the
//! authentication interceptor

pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use claims::{
    build_access_claims, build_refresh_claims, Access, AccessClaims, ClaimSet, Purpose, Refresh,
    RefreshClaims, TokenKind,
};
pub use jwt::{sign, sign_at, verify, JwtService, SigningKey, TokenError};
pub use middleware::{extract_token, AuthContext, Authenticate, Authenticated, RefreshContext};
pub use password::{Digest, PasswordHasher};
