use super::Session;
use super::DEFAULT_SESSION_TITLE;
use crate::domain::models::Message;

#[test]
fn it_creates_ids_with_timestamp_and_suffix() {
    let id = Session::create_id();
    let parts = id.split('-').collect::<Vec<&str>>();

    assert_eq!(parts.len(), 2);
    assert!(parts[0].parse::<i64>().is_ok());
    assert_eq!(parts[1].len(), 8);
}

#[test]
fn it_creates_distinct_ids() {
    assert_ne!(Session::create_id(), Session::create_id());
}

#[test]
fn it_keeps_short_queries_as_title() {
    assert_eq!(
        Session::title_from_query("How do I switch careers?"),
        "How do I switch careers?"
    );
}

#[test]
fn it_truncates_long_queries_to_fifty_chars() {
    let query = "What are the best ways to prepare for a product manager interview at a large company?";
    let title = Session::title_from_query(query);

    assert_eq!(title.chars().count(), 50);
    assert!(query.starts_with(&title));
}

#[test]
fn it_truncates_on_char_boundaries() {
    let query = "é".repeat(60);
    assert_eq!(Session::title_from_query(&query), "é".repeat(50));
}

#[test]
fn it_detects_drafts() {
    let mut session = Session::new("1", DEFAULT_SESSION_TITLE);
    assert!(session.is_draft());

    session.messages.push(Message::human("Hi"));
    assert!(!session.is_draft());

    let renamed = Session::new("2", "Resume review");
    assert!(!renamed.is_draft());
}
