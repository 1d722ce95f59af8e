use crate::domain_model::{IssuedAccessToken, UserId};

#[derive(Debug, thiserror::Error)]
pub enum IssuerError {
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("token rejected: {0}")]
    Invalid(String),
}

pub trait TokenIssuer: Send + Sync {
    /// Mint a signed access token carrying the user id and the admin flag.
    fn mint(&self, user_id: UserId, is_admin: bool) -> Result<IssuedAccessToken, IssuerError>;
}
