//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to turn credentials into an [`Actor`] without
//! importing the backing infrastructure.

use async_trait::async_trait;

use crate::domain::{Actor, Error, LoginCredentials, Role, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated actor.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Actor, Error>;
}

/// Authenticator accepting a single fixed admin account.
///
/// `admin@carelink.test` / `password` authenticates as an admin with a fixed id.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

impl FixtureLoginService {
    pub const EMAIL: &'static str = "admin@carelink.test";
    pub const PASSWORD: &'static str = "password";
    pub const USER_ID: &'static str = "123e4567-e89b-12d3-a456-426614174000";
}

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Actor, Error> {
        if credentials.email().as_str() == Self::EMAIL && credentials.password() == Self::PASSWORD
        {
            let id = UserId::parse(Self::USER_ID)
                .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))?;
            Ok(Actor::new(id, Role::Admin))
        } else {
            Err(Error::unauthenticated("invalid credentials"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("admin@carelink.test", "password", true)]
    #[case("admin@carelink.test", "wrong", false)]
    #[case("other@carelink.test", "password", false)]
    #[tokio::test]
    async fn fixture_login_service_accepts_only_the_fixed_admin(
        #[case] email: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let service = FixtureLoginService;
        let creds = LoginCredentials::try_from_parts(email, password).expect("credentials shape");
        match (should_succeed, service.authenticate(&creds).await) {
            (true, Ok(actor)) => {
                assert_eq!(actor.id.to_string(), FixtureLoginService::USER_ID);
                assert_eq!(actor.role, Role::Admin);
            }
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthenticated),
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(actor)) => panic!("expected failure, got success: {actor:?}"),
        }
    }
}
