//! Tests for the ownership helpers, key generation, sessions and error messages
//!
//! The fixture mirrors a small database with two users and three URLs.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};

use tinylink::access::{
    can_access, find_user_by_email, is_authenticated, unique_visitor_count, urls_owned_by,
};
use tinylink::error::{message_for, resolve_error_message, Action, ErrorCode};
use tinylink::keygen::{generate_short_key, try_generate_short_key, SHORT_KEY_LENGTH};
use tinylink::model::{Session, UrlRecord, UserRecord, VisitEvent};
use tinylink::session;

fn visit(visitor_id: &str, time: &str) -> VisitEvent {
    VisitEvent {
        visitor_id: visitor_id.to_string(),
        time: time.parse::<DateTime<Utc>>().unwrap(),
    }
}

fn record(long_url: &str, owner: &str, created: &str, visits: Vec<VisitEvent>) -> UrlRecord {
    UrlRecord {
        long_url: long_url.to_string(),
        owner_user_id: owner.to_string(),
        created_date: created.to_string(),
        visit_histories: visits,
    }
}

fn url_database() -> BTreeMap<String, UrlRecord> {
    let mut urls = BTreeMap::new();
    urls.insert(
        "b2xVn2".to_string(),
        record(
            "http://www.lighthouselabs.ca",
            "userRandomID",
            "8/21/2022",
            vec![
                visit("eiG484", "2021-12-09T00:19:09.556Z"),
                visit("L0hnVt", "2022-02-15T00:05:35.937Z"),
                visit("eiG484", "2022-05-28T00:19:41.149Z"),
            ],
        ),
    );
    urls.insert(
        "9sm5xK".to_string(),
        record("http://www.google.com", "userRandomID", "7/16/2021", vec![]),
    );
    urls.insert(
        "4glap5".to_string(),
        record("http://www.example.com", "user2RandomID", "4/27/2022", vec![]),
    );
    urls
}

fn test_users() -> BTreeMap<String, UserRecord> {
    let mut users = BTreeMap::new();
    for (id, email) in [
        ("userRandomID", "user@example.com"),
        ("user2RandomID", "user2@example.com"),
    ] {
        users.insert(
            id.to_string(),
            UserRecord {
                id: id.to_string(),
                email: email.to_string(),
                password_hash: "unused".to_string(),
            },
        );
    }
    users
}

#[test]
fn test_generate_short_key_length_and_alphabet() {
    let urls = url_database();
    let key = generate_short_key(&urls);

    assert_eq!(key.len(), SHORT_KEY_LENGTH);
    assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    assert!(!urls.contains_key(&key));
}

#[test]
fn test_generate_short_key_skips_taken_keys() {
    let mut taken: HashSet<String> = HashSet::new();
    for _ in 0..200 {
        let key = generate_short_key(&taken);
        assert!(taken.insert(key), "generated a key that was already taken");
    }
    assert_eq!(taken.len(), 200);
}

#[test]
fn test_try_generate_short_key_retries_until_free() {
    let mut attempts = 0;
    let key = try_generate_short_key(|_| {
        attempts += 1;
        Ok::<_, ()>(attempts < 4)
    })
    .unwrap();

    assert_eq!(attempts, 4);
    assert_eq!(key.len(), SHORT_KEY_LENGTH);
}

#[test]
fn test_try_generate_short_key_propagates_probe_error() {
    let result = try_generate_short_key(|_| Err::<bool, _>("table unavailable"));
    assert_eq!(result, Err("table unavailable"));
}

#[test]
fn test_find_user_by_email_found() {
    let users = test_users();
    assert_eq!(
        find_user_by_email("user@example.com", &users),
        Some("userRandomID")
    );
}

#[test]
fn test_find_user_by_email_missing() {
    let users = test_users();
    assert_eq!(find_user_by_email("test@example.com", &users), None);
    assert_eq!(find_user_by_email("", &users), None);
}

#[test]
fn test_is_authenticated_with_user() {
    let session: Session = serde_json::from_str(r#"{"user_id":"userRandomID"}"#).unwrap();
    assert!(is_authenticated(&session));
}

#[test]
fn test_is_authenticated_absent_and_null_user() {
    let absent: Session = serde_json::from_str("{}").unwrap();
    let null: Session = serde_json::from_str(r#"{"user_id":null,"visitor_id":"f3t4gz"}"#).unwrap();

    assert!(!is_authenticated(&absent));
    assert!(!is_authenticated(&null));
}

#[test]
fn test_logout_keeps_visitor_id() {
    let mut session = Session {
        user_id: Some("userRandomID".to_string()),
        visitor_id: Some("f3t4gz".to_string()),
    };
    session.logout();

    assert!(!is_authenticated(&session));
    assert_eq!(session.visitor_id.as_deref(), Some("f3t4gz"));
}

#[test]
fn test_session_cookie_value_decodes() {
    let session = Session {
        user_id: Some("userRandomID".to_string()),
        visitor_id: None,
    };
    let value = session::encode(&session).unwrap();

    assert!(!value.contains('"'));
    assert_eq!(session::decode(&value), Some(session));
    assert_eq!(session::decode("not base64 !"), None);
}

#[test]
fn test_urls_owned_by_user() {
    let urls = url_database();
    let owned = urls_owned_by("userRandomID", &urls);

    assert_eq!(owned.len(), 2);
    assert_eq!(owned["b2xVn2"].record, urls["b2xVn2"]);
    assert_eq!(owned["b2xVn2"].unique_visitors, 2);
    assert_eq!(owned["9sm5xK"].record, urls["9sm5xK"]);
    assert_eq!(owned["9sm5xK"].unique_visitors, 0);
    assert!(!owned.contains_key("4glap5"));
}

#[test]
fn test_urls_owned_by_unknown_user() {
    let urls = url_database();
    assert!(urls_owned_by("user3RandomID", &urls).is_empty());
}

#[test]
fn test_urls_owned_by_serializes_flat() {
    let urls = url_database();
    let owned = urls_owned_by("user2RandomID", &urls);
    let value = serde_json::to_value(&owned).unwrap();

    assert_eq!(value["4glap5"]["long_url"], "http://www.example.com");
    assert_eq!(value["4glap5"]["created_date"], "4/27/2022");
    assert_eq!(value["4glap5"]["unique_visitors"], 0);
}

#[test]
fn test_can_access_own_url() {
    let urls = url_database();
    assert!(can_access("userRandomID", "b2xVn2", &urls));
}

#[test]
fn test_can_access_foreign_or_missing_url() {
    let urls = url_database();
    assert!(!can_access("user2RandomID", "b2xVn2", &urls));
    assert!(!can_access("userRandomID", "4glap5", &urls));
    assert!(!can_access("userRandomID", "zzzzzz", &urls));
}

#[test]
fn test_can_access_matches_owned_subset() {
    let urls = url_database();
    for user in ["userRandomID", "user2RandomID", "user3RandomID"] {
        let owned = urls_owned_by(user, &urls);
        for key in urls.keys() {
            assert_eq!(can_access(user, key, &urls), owned.contains_key(key));
        }
    }
}

#[test]
fn test_unique_visitor_count() {
    let urls = url_database();
    assert_eq!(unique_visitor_count(&urls["b2xVn2"]), 2);
    assert_eq!(unique_visitor_count(&urls["9sm5xK"]), 0);
}

#[test]
fn test_error_message_register_and_login() {
    assert_eq!(
        resolve_error_message("400", Some(Action::Register)),
        "The Email or password might be empty, or the email is already existing."
    );
    assert_eq!(
        resolve_error_message("400", Some(Action::Login)),
        "The Email or password might be empty."
    );
    assert_eq!(
        resolve_error_message("401", Some(Action::Login)),
        "The Email or password is NOT correct, or the email is NOT existing."
    );
}

#[test]
fn test_error_message_without_action() {
    assert_eq!(resolve_error_message("403", None), "You can not access this page.");
    assert_eq!(resolve_error_message("404", None), "The page is NOT Found.");
    assert_eq!(resolve_error_message("400", None), "The page is NOT Found.");
}

#[test]
fn test_error_message_unknown_code() {
    assert_eq!(resolve_error_message("418", None), "The page is NOT Found.");
    assert_eq!(
        resolve_error_message("abc", Some(Action::Login)),
        "The page is NOT Found."
    );
    assert_eq!(ErrorCode::from_status("500"), None);
    assert_eq!(
        message_for(ErrorCode::Forbidden, Some(Action::Register)),
        "You can not access this page."
    );
}
