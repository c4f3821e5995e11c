use anyhow::Result;
use mockito::Matcher;
use test_utils::chat_history_body;

use super::AnswerApi;
use crate::domain::models::AnswerService;
use crate::domain::models::Message;

impl AnswerApi {
    fn with_url(url: String) -> AnswerApi {
        return AnswerApi::new(&url, "200");
    }
}

#[tokio::test]
async fn it_successfully_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .with_status(200)
        .with_body(r#"{"message": "Careerist Chatbot Backend Running"}"#)
        .create_async()
        .await;

    let backend = AnswerApi::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_fails_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .with_status(500)
        .create_async()
        .await;

    let backend = AnswerApi::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_fails_health_checks_without_url() {
    let backend = AnswerApi::new("", "200");
    assert!(backend.health_check().await.is_err());
}

#[tokio::test]
async fn it_trims_trailing_slashes() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .with_status(200)
        .create_async()
        .await;

    let backend = AnswerApi::with_url(format!("{}//", server.url()));
    assert!(backend.health_check().await.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_asks_with_form_fields() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/ask")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "How do I switch careers?".into()),
            Matcher::UrlEncoded("session_id".into(), "1700000000000-a1b2c3d4".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_history_body(
            Some("Start with transferable skills."),
            &[
                ("human", "How do I switch careers?"),
                ("ai", "Start with transferable skills."),
            ],
        ))
        .create_async()
        .await;

    let backend = AnswerApi::with_url(server.url());
    let res = backend
        .ask("How do I switch careers?", "1700000000000-a1b2c3d4")
        .await?;
    mock.assert_async().await;

    assert_eq!(res.answer, Some("Start with transferable skills.".to_string()));
    assert_eq!(
        res.chat_history,
        Some(vec![
            Message::human("How do I switch careers?"),
            Message::ai("Start with transferable skills."),
        ])
    );
    return Ok(());
}

#[tokio::test]
async fn it_asks_with_answer_only() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/ask")
        .with_status(200)
        .with_body(r#"{"answer": "Network with people in the field."}"#)
        .create_async()
        .await;

    let backend = AnswerApi::with_url(server.url());
    let res = backend.ask("Any tips?", "1").await?;
    mock.assert_async().await;

    assert_eq!(res.answer, Some("Network with people in the field.".to_string()));
    assert_eq!(res.chat_history, None);
    assert!(res.authoritative_history().is_none());
    return Ok(());
}

#[tokio::test]
async fn it_fails_asking_on_error_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/ask")
        .with_status(502)
        .with_body(r#"{"answer": "never read"}"#)
        .create_async()
        .await;

    let backend = AnswerApi::with_url(server.url());
    let res = backend.ask("Any tips?", "1").await;

    assert!(res.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_fails_asking_on_malformed_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/ask")
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let backend = AnswerApi::with_url(server.url());
    let res = backend.ask("Any tips?", "1").await;

    assert!(res.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_fails_asking_when_unreachable() {
    let backend = AnswerApi::new("http://127.0.0.1:1", "200");
    assert!(backend.ask("Any tips?", "1").await.is_err());
}

#[tokio::test]
async fn it_fetches_history() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/history")
        .match_query(Matcher::UrlEncoded("session_id".into(), "abc 123".into()))
        .with_status(200)
        .with_body(chat_history_body(
            None,
            &[("human", "Hello"), ("ai", "Hi! How can I help your career?")],
        ))
        .create_async()
        .await;

    let backend = AnswerApi::with_url(server.url());
    let res = backend.history("abc 123").await?;
    mock.assert_async().await;

    assert_eq!(
        res,
        vec![
            Message::human("Hello"),
            Message::ai("Hi! How can I help your career?"),
        ]
    );
    return Ok(());
}

#[tokio::test]
async fn it_fetches_empty_history() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/history")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"chat_history": []}"#)
        .create_async()
        .await;

    let backend = AnswerApi::with_url(server.url());
    assert!(backend.history("missing").await?.is_empty());
    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_converts_text_to_speech() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/tts")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("text".into(), "Good luck!".into()),
            Matcher::UrlEncoded("lang".into(), "en".into()),
            Matcher::UrlEncoded("voice".into(), "female".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "audio/mpeg")
        .with_body(vec![0x49, 0x44, 0x33])
        .create_async()
        .await;

    let backend = AnswerApi::with_url(server.url());
    let audio = backend.text_to_speech("Good luck!", "en", "female").await?;
    mock.assert_async().await;

    assert_eq!(audio, vec![0x49, 0x44, 0x33]);
    return Ok(());
}
