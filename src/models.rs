use chrono::NaiveDateTime;
use serde::Serialize;

/// A live short-link record from the `links` table (or its in-memory twin).
///
/// `code` is the immutable primary key. `clicks` starts at 0 and is only ever
/// advanced by the resolution path; administrative updates rewrite `url` and
/// `indexable` but must leave `clicks` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Record {
    pub code: String,
    pub url: String,
    pub clicks: i64,
    pub indexable: bool,
    pub created_at: NaiveDateTime,
}

/// What a successful resolution hands back to the redirect handler: the
/// target plus the indexing hint, captured in the same atomic step as the
/// click increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub url: String,
    pub indexable: bool,
}
