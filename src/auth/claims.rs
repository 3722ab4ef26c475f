//! Token claim sets
//!
//! A claim set carries the identity of its subject plus exactly one purpose
//! flag. The purpose is fixed by the type parameter, so an access claim set can
//! never be handed to code expecting a refresh one.

use crate::models::user::Identity;
use std::marker::PhantomData;

/// Purpose flag embedded in every token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Access,
    Refresh,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Access => "access",
            Purpose::Refresh => "refresh",
        }
    }
}

/// Type-level token kind
pub trait TokenKind:
    std::fmt::Debug + Clone + Copy + PartialEq + Eq + Send + Sync + 'static
{
    const PURPOSE: Purpose;
}

/// Short-lived token used on every authenticated call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access;

/// Long-lived token used only to mint a new pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refresh;

impl TokenKind for Access {
    const PURPOSE: Purpose = Purpose::Access;
}

impl TokenKind for Refresh {
    const PURPOSE: Purpose = Purpose::Refresh;
}

/// Claims embedded in a token of kind `K`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet<K: TokenKind> {
    pub user_id: String,
    pub username: String,
    pub name: String,
    kind: PhantomData<K>,
}

pub type AccessClaims = ClaimSet<Access>;
pub type RefreshClaims = ClaimSet<Refresh>;

impl<K: TokenKind> ClaimSet<K> {
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            name: name.into(),
            kind: PhantomData,
        }
    }

    pub fn for_identity(identity: &Identity) -> Self {
        Self::new(
            identity.id.clone(),
            identity.username.clone(),
            identity.name.clone(),
        )
    }

    pub fn purpose(&self) -> Purpose {
        K::PURPOSE
    }
}

/// Access claims for `identity` (`access=true`)
pub fn build_access_claims(identity: &Identity) -> AccessClaims {
    ClaimSet::for_identity(identity)
}

/// Refresh claims for `identity` (`refresh=true`)
pub fn build_refresh_claims(identity: &Identity) -> RefreshClaims {
    ClaimSet::for_identity(identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Identity {
        Identity {
            id: "6a1f".to_string(),
            username: "alice".to_string(),
            name: "Alice".to_string(),
        }
    }

    #[test]
    fn test_purpose_follows_kind() {
        let access = build_access_claims(&alice());
        let refresh = build_refresh_claims(&alice());

        assert_eq!(access.purpose(), Purpose::Access);
        assert_eq!(refresh.purpose(), Purpose::Refresh);
    }

    #[test]
    fn test_identity_is_copied() {
        let claims = build_access_claims(&alice());
        assert_eq!(claims.user_id, "6a1f");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.name, "Alice");
    }
}
