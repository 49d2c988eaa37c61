use serde::{Deserialize, Serialize};
use time::{macros::datetime, OffsetDateTime};

use crate::store::{merge_text, Record, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    /// Argon2 hash, only set on auth accounts and never serialized.
    #[serde(skip)]
    pub password_hash: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserDraft {
    pub username: Option<String>,
    pub email: Option<String>,
    /// Set by registration only; a request body cannot supply it.
    #[serde(skip)]
    pub password_hash: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// The users listing takes no query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {}

impl Record for User {
    const KIND: &'static str = "User";
    type Draft = UserDraft;
    type Patch = UserPatch;
    type Filter = UserFilter;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(
        id: u64,
        draft: UserDraft,
        created_at: OffsetDateTime,
    ) -> Result<Self, StoreError> {
        let (Some(username), Some(email)) = (non_empty(draft.username), non_empty(draft.email))
        else {
            return Err(StoreError::Validation("Username and email are required"));
        };
        Ok(Self {
            id,
            username,
            email,
            password_hash: draft.password_hash,
            created_at,
        })
    }

    // Uniqueness is only checked at registration; updates may introduce duplicates.
    fn apply(&mut self, patch: UserPatch) {
        merge_text(&mut self.username, patch.username);
        merge_text(&mut self.email, patch.email);
    }

    fn matches(&self, _filter: &UserFilter) -> bool {
        true
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub fn seed() -> Vec<User> {
    [
        (1, "john_doe", "john@example.com", datetime!(2023-01-15 0:00 UTC)),
        (2, "jane_smith", "jane@example.com", datetime!(2023-02-20 0:00 UTC)),
        (3, "bob_wilson", "bob@example.com", datetime!(2023-03-10 0:00 UTC)),
        (4, "alice_brown", "alice@example.com", datetime!(2023-04-05 0:00 UTC)),
        (5, "charlie_davis", "charlie@example.com", datetime!(2023-05-12 0:00 UTC)),
    ]
    .into_iter()
    .map(|(id, username, email, created_at)| User {
        id,
        username: username.into(),
        email: email.into(),
        password_hash: None,
        created_at,
    })
    .collect()
}
