//! Short key generation
//!
//! Keys are `SHORT_KEY_LENGTH` characters drawn uniformly from the 62-symbol
//! alphanumeric alphabet. Generation retries until the candidate is free.
//!
//! # Known limitation
//!
//! There is no retry bound. With 62^6 possible keys collisions are rare, but
//! a key space close to exhaustion would make generation loop for a long time.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::convert::Infallible;
use std::hash::BuildHasher;

use rand::{distr::Alphanumeric, Rng};

pub const SHORT_KEY_LENGTH: usize = 6;

/// A collection that can tell whether a short key is already in use
pub trait KeySpace {
    fn contains_key(&self, key: &str) -> bool;
}

impl<V> KeySpace for BTreeMap<String, V> {
    fn contains_key(&self, key: &str) -> bool {
        BTreeMap::contains_key(self, key)
    }
}

impl<V, S: BuildHasher> KeySpace for HashMap<String, V, S> {
    fn contains_key(&self, key: &str) -> bool {
        HashMap::contains_key(self, key)
    }
}

impl KeySpace for BTreeSet<String> {
    fn contains_key(&self, key: &str) -> bool {
        self.contains(key)
    }
}

impl<S: BuildHasher> KeySpace for HashSet<String, S> {
    fn contains_key(&self, key: &str) -> bool {
        self.contains(key)
    }
}

/// Draws a single random key without checking for collisions
pub fn random_key() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SHORT_KEY_LENGTH)
        .map(char::from)
        .collect()
}

/// Generates a key that is not present in `existing`
pub fn generate_short_key<K: KeySpace + ?Sized>(existing: &K) -> String {
    let result: Result<String, Infallible> =
        try_generate_short_key(|candidate| Ok(existing.contains_key(candidate)));
    match result {
        Ok(key) => key,
        Err(never) => match never {},
    }
}

/// Generates a key using a fallible membership probe
///
/// Used when the key space lives in a database table and every lookup can fail.
pub fn try_generate_short_key<E, F>(mut is_taken: F) -> Result<String, E>
where
    F: FnMut(&str) -> Result<bool, E>,
{
    loop {
        let candidate = random_key();
        if !is_taken(&candidate)? {
            return Ok(candidate);
        }
        tracing::debug!(key = %candidate, "short key collision, retrying");
    }
}
