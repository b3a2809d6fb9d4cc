//! Driving ports for personal profile reads and edits.

use async_trait::async_trait;

use crate::domain::{Actor, Error, ProfileUpdate, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Apply a partial profile update. Doctors are always denied.
    async fn update_profile(
        &self,
        actor: &Actor,
        target_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error>;

    /// Replace the stored credential. Same rules as profile updates.
    async fn change_password(
        &self,
        actor: &Actor,
        target_id: &UserId,
        new_password: String,
    ) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// The record of the authenticated caller.
    async fn current_user(&self, actor: &Actor) -> Result<User, Error>;
}
