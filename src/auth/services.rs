use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::{
    dto::{Availability, Credentials, RegisterForm},
    password::PasswordScheme,
    repo_types::{NewUser, User},
};
use crate::db::StoreError;

/// Looks up whether the submitted username and email are already in use.
/// Advisory only: nothing stops a concurrent registration from racing past it.
pub async fn check_availability(
    db: &SqlitePool,
    form: &RegisterForm,
) -> Result<Availability, StoreError> {
    let username_taken = !form.username.is_empty()
        && User::find_by_username(db, &form.username).await?.is_some();
    let email_taken = !form.email.is_empty() && User::find_by_email(db, &form.email).await?.is_some();
    debug!(username_taken, email_taken, "registration availability");
    Ok(Availability {
        username_taken,
        email_taken,
    })
}

pub async fn register(
    db: &SqlitePool,
    scheme: PasswordScheme,
    new_user: &NewUser,
) -> anyhow::Result<User> {
    let stored = scheme.store(&new_user.password)?;
    let user = User::create(db, &new_user.username, &new_user.email, &stored).await?;
    Ok(user)
}

/// The user the credentials belong to, or `None` on any mismatch. Unknown
/// usernames and wrong passwords are indistinguishable to the caller.
pub async fn authenticate(
    db: &SqlitePool,
    scheme: PasswordScheme,
    credentials: &Credentials<'_>,
) -> Result<Option<User>, StoreError> {
    let Some(user) = User::find_by_username(db, credentials.username).await? else {
        warn!(username = %credentials.username, "login unknown username");
        return Ok(None);
    };
    if !scheme.matches(credentials.password, &user.password) {
        warn!(user_id = user.id, "login invalid password");
        return Ok(None);
    }
    Ok(Some(user))
}
