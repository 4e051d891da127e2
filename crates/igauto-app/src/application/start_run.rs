//! StartRunUseCase: validates user input before a run is dispatched.
//!
//! A run that fails validation is never started; the error text is what the
//! front end shows the user.

use std::fmt;

use igauto_core::{parse_target_lines, ActionKind, Settings, FOLLOW_COUNT_RANGE};
use thiserror::Error;

use crate::application::bot::BotRequest;

/// Problems with what the user entered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter your Instagram credentials.")]
    MissingCredentials,

    #[error("Please enter at least one target account.")]
    NoTargetAccounts,

    #[error("Users to follow per account must be between 1 and 1000, got {0}.")]
    FollowCountOutOfRange(u32),

    #[error("Please import a CSV file with at least one valid username.")]
    NoUnfollowList,

    #[error("A {0} run is already in progress.")]
    RunInProgress(ActionKind),
}

/// Login details for the bot.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn check(&self) -> Result<(), InputError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(InputError::MissingCredentials);
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything on the follow tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowForm {
    pub credentials: Credentials,
    /// Newline-separated target accounts as typed.
    pub target_accounts: String,
    pub follow_count: u32,
}

impl FollowForm {
    /// The part of the form that is persisted.  The password is left out.
    pub fn to_settings(&self) -> Settings {
        Settings {
            username: self.credentials.username.clone(),
            target_accounts: self.target_accounts.clone(),
            follow_count: self.follow_count,
        }
    }
}

/// Validates the follow tab and builds the bot request for a follow run.
///
/// # Errors
///
/// Credentials are checked first, then the target list, then the quota.
pub fn follow_request(form: &FollowForm) -> Result<BotRequest, InputError> {
    form.credentials.check()?;

    let targets = parse_target_lines(&form.target_accounts);
    if targets.is_empty() {
        return Err(InputError::NoTargetAccounts);
    }

    if !FOLLOW_COUNT_RANGE.contains(&form.follow_count) {
        return Err(InputError::FollowCountOutOfRange(form.follow_count));
    }

    Ok(BotRequest {
        username: form.credentials.username.trim().to_string(),
        password: form.credentials.password.clone(),
        accounts: targets,
        users_per_account: form.follow_count,
    })
}

/// Validates an unfollow run over the imported list.
///
/// # Errors
///
/// Returns [`InputError::MissingCredentials`] or
/// [`InputError::NoUnfollowList`] when nothing usable was imported.
pub fn unfollow_request(
    credentials: &Credentials,
    unfollow_list: Option<&[String]>,
) -> Result<BotRequest, InputError> {
    credentials.check()?;

    let accounts = match unfollow_list {
        Some(list) if !list.is_empty() => list.to_vec(),
        _ => return Err(InputError::NoUnfollowList),
    };

    Ok(BotRequest {
        username: credentials.username.trim().to_string(),
        password: credentials.password.clone(),
        accounts,
        users_per_account: 0,
    })
}
