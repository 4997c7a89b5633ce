//! Ownership and access helpers
//!
//! Pure functions over already loaded collections. They never fail: "not
//! found" is `None`, "not authorized" is `false`. Callers translate those into
//! responses.

use std::collections::{BTreeMap, HashSet};

use crate::model::{OwnedUrl, Session, UrlRecord, UserRecord};

/// Returns the id of the first user registered with `email`
pub fn find_user_by_email<'a>(
    email: &str,
    users: &'a BTreeMap<String, UserRecord>,
) -> Option<&'a str> {
    users
        .iter()
        .find(|(_, user)| user.email == email)
        .map(|(id, _)| id.as_str())
}

/// True iff the session carries an authenticated user id
pub fn is_authenticated(session: &Session) -> bool {
    session.user_id.is_some()
}

/// Number of distinct visitors in a record's history
pub fn unique_visitor_count(record: &UrlRecord) -> usize {
    record
        .visit_histories
        .iter()
        .map(|visit| visit.visitor_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Selects the records owned by `user_id`, each enriched with its unique
/// visitor count
///
/// Records whose owner does not exist are simply never selected.
pub fn urls_owned_by(
    user_id: &str,
    urls: &BTreeMap<String, UrlRecord>,
) -> BTreeMap<String, OwnedUrl> {
    urls.iter()
        .filter(|(_, record)| record.owner_user_id == user_id)
        .map(|(key, record)| {
            let owned = OwnedUrl {
                record: record.clone(),
                unique_visitors: unique_visitor_count(record),
            };
            (key.clone(), owned)
        })
        .collect()
}

/// True iff `key` is one of the records owned by `user_id`
///
/// Equivalent to `urls_owned_by(user_id, urls).contains_key(key)` without
/// building the owned map. Authentication is checked separately.
pub fn can_access(user_id: &str, key: &str, urls: &BTreeMap<String, UrlRecord>) -> bool {
    urls.get(key)
        .is_some_and(|record| record.owner_user_id == user_id)
}
