use std::env;

use serde_json::json;

pub fn insta_snapshot<F: FnOnce()>(f: F) {
    let mut settings = insta::Settings::clone_current();
    let snapshot_path = env::current_dir().unwrap().join("./test/snapshots");
    settings.set_snapshot_path(snapshot_path);
    settings.bind(f);
}

/// A stored `chat_sessions` blob holding one answered session followed by
/// an untouched draft.
pub fn sessions_blob_fixture() -> &'static str {
    return r#"
[
  {
    "id": "1700000000000-a1b2c3d4",
    "title": "How do I switch careers?",
    "messages": [
      { "role": "human", "content": "How do I switch careers?" },
      { "role": "ai", "content": "Start by listing the skills that transfer." }
    ]
  },
  {
    "id": "1690000000000-e5f6a7b8",
    "title": "New Chat",
    "messages": []
  }
]
"#
    .trim();
}

/// Builds a `/history` or `/ask` response body from `(role, content)` pairs.
pub fn chat_history_body(answer: Option<&str>, history: &[(&str, &str)]) -> String {
    let chat_history = history
        .iter()
        .map(|(role, content)| {
            return json!({ "role": role, "content": content });
        })
        .collect::<Vec<_>>();

    let mut body = json!({ "chat_history": chat_history });
    if let Some(answer) = answer {
        body["answer"] = json!(answer);
    }

    return body.to_string();
}
