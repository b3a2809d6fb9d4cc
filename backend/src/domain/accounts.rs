//! Account service: login, provisioning, and personal profile edits.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{
    CredentialError, CredentialVerifier, LoginService, ProfileCommand, ProfileQuery,
    UserRepository,
};
use crate::domain::user_store::{UserStore, map_user_persistence_error};
use crate::domain::{
    Action, Actor, Email, Error, LoginCredentials, Profile, ProfileUpdate, Role, User, UserId,
    UserValidationError, can,
};

/// Minimum password length accepted when provisioning or changing a password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Account to provision outside the request path, e.g. from a seed file.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: Zeroizing<String>,
    pub name: String,
    pub role: Role,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

fn map_user_validation(error: UserValidationError) -> Error {
    let field = match error {
        UserValidationError::EmptyEmail | UserValidationError::MalformedEmail => "email",
        UserValidationError::EmptyName => "name",
    };
    Error::validation(error.to_string()).with_details(json!({ "field": field }))
}

fn map_credential_error(error: CredentialError) -> Error {
    Error::internal(error.to_string())
}

fn check_password(password: &str) -> Result<(), Error> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        ))
        .with_details(json!({ "field": "password" })));
    }
    Ok(())
}

/// Account service implementing login and profile ports.
pub struct AccountService<R, C> {
    users: UserStore<R>,
    credentials: Arc<C>,
}

impl<R, C> Clone for AccountService<R, C> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            credentials: Arc::clone(&self.credentials),
        }
    }
}

impl<R: UserRepository, C: CredentialVerifier> AccountService<R, C> {
    pub fn new(repo: Arc<R>, credentials: Arc<C>) -> Self {
        Self {
            users: UserStore::new(repo),
            credentials,
        }
    }

    /// Create a user with empty links, ledger, and inbox.
    ///
    /// # Errors
    /// `validation` for malformed fields, `conflict` when the email is taken.
    pub async fn register(&self, new_user: NewUser) -> Result<User, Error> {
        let email = Email::new(&new_user.email).map_err(map_user_validation)?;
        let profile = Profile::named(new_user.name).map_err(map_user_validation)?;
        check_password(&new_user.password)?;
        let credential = self
            .credentials
            .hash(&new_user.password)
            .map_err(map_credential_error)?;

        let user = User::new(UserId::random(), email, credential, profile, new_user.role);
        let stored = self
            .users
            .repository()
            .insert(&user)
            .await
            .map_err(map_user_persistence_error)?;
        info!(user_id = %stored.id(), role = %stored.role(), "user provisioned");
        Ok(stored)
    }
}

#[async_trait]
impl<R: UserRepository, C: CredentialVerifier> LoginService for AccountService<R, C> {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Actor, Error> {
        let user = self
            .users
            .repository()
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_persistence_error)?;
        match user {
            Some(user)
                if self
                    .credentials
                    .verify(credentials.password(), user.credential()) =>
            {
                Ok(Actor::new(user.id(), user.role()))
            }
            _ => Err(Error::unauthenticated("invalid credentials")),
        }
    }
}

#[async_trait]
impl<R: UserRepository, C: CredentialVerifier> ProfileCommand for AccountService<R, C> {
    async fn update_profile(
        &self,
        actor: &Actor,
        target_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let target = self.users.load(target_id).await?;
        can(actor, Action::UpdateProfile, &target)?;

        let (user, ()) = self
            .users
            .mutate(target_id, |user| {
                can(actor, Action::UpdateProfile, user)?;
                user.profile_mut()
                    .apply(update.clone())
                    .map_err(map_user_validation)
            })
            .await?;
        info!(user_id = %target_id, actor_id = %actor.id, "profile updated");
        Ok(user)
    }

    async fn change_password(
        &self,
        actor: &Actor,
        target_id: &UserId,
        new_password: String,
    ) -> Result<(), Error> {
        let new_password = Zeroizing::new(new_password);
        let target = self.users.load(target_id).await?;
        can(actor, Action::UpdateProfile, &target)?;
        check_password(&new_password)?;
        let credential = self
            .credentials
            .hash(&new_password)
            .map_err(map_credential_error)?;

        self.users
            .mutate(target_id, |user| {
                can(actor, Action::UpdateProfile, user)?;
                user.set_credential(credential.clone());
                Ok(())
            })
            .await?;
        info!(user_id = %target_id, actor_id = %actor.id, "password changed");
        Ok(())
    }
}

#[async_trait]
impl<R: UserRepository, C: CredentialVerifier> ProfileQuery for AccountService<R, C> {
    async fn current_user(&self, actor: &Actor) -> Result<User, Error> {
        self.users.load(&actor.id).await
    }
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
