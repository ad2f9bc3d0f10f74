//! Handler tests against a mocked Bot API (wiremock)
//!
//! Updates are pushed through the real dispatcher schema; assertions look at
//! the requests the handlers sent and at the store afterwards.
//!
//! Run with: cargo test --test handlers_test

mod common;

use std::ops::ControlFlow;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use teloxide::dptree;
use teloxide::types::{Me, Message, Update};
use teloxide::Bot;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{TestEnvironment, ADMIN_ID};
use filelink_bot::storage::{FileKind, SettingKey};
use filelink_bot::telegram::handlers::extract_upload;
use filelink_bot::telegram::markdown::escape_markdown_v2;
use filelink_bot::telegram::messages;
use filelink_bot::telegram::{schema, HandlerDeps};

const USER_ID: i64 = 2000;
const BOT_USERNAME: &str = "test_bot";

struct HandlerHarness {
    server: MockServer,
    bot: Bot,
    env: TestEnvironment,
}

impl HandlerHarness {
    async fn new() -> Self {
        let server = MockServer::start().await;
        let bot = Bot::new("123456:TEST").set_api_url(server.uri().parse().unwrap());
        Self {
            server,
            bot,
            env: TestEnvironment::new(),
        }
    }

    fn deps(&self) -> HandlerDeps {
        HandlerDeps::new(self.env.store.clone(), Arc::new(self.env.config.clone()), BOT_USERNAME)
    }

    /// Answers every call of `api_method` with a sent message
    async fn mount_ok(&self, api_method: &str) {
        Mock::given(method("POST"))
            .and(path_regex(method_path(api_method)))
            .respond_with(ResponseTemplate::new(200).set_body_json(sent_message()))
            .mount(&self.server)
            .await;
    }

    /// Rejects the next call of `api_method` with a Bot API error
    async fn mount_error_once(&self, api_method: &str, description: &str) {
        let body = json!({ "ok": false, "error_code": 400, "description": description });
        Mock::given(method("POST"))
            .and(path_regex(method_path(api_method)))
            .respond_with(ResponseTemplate::new(400).set_body_json(body))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    async fn dispatch(&self, message: Value) {
        // teloxide's `Update` deserializer yields `UpdateKind::Error` when fed a
        // `serde_json::Value`, so round-trip through a string.
        let raw = json!({ "update_id": 1, "message": message }).to_string();
        let update: Update = serde_json::from_str(&raw).unwrap();
        let result = schema(self.deps())
            .dispatch(dptree::deps![self.bot.clone(), bot_me(), update])
            .await;

        match result {
            ControlFlow::Break(Ok(())) => {}
            ControlFlow::Break(Err(e)) => panic!("handler failed: {}", e),
            ControlFlow::Continue(_) => panic!("update was not handled"),
        }
    }

    /// Lowercased method names of the calls made, in order
    async fn called_methods(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter_map(|r| r.url.path_segments().and_then(|s| s.last()).map(str::to_lowercase))
            .collect()
    }

    /// JSON bodies of the sendMessage calls, in order
    async fn sent_messages(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path().to_lowercase().ends_with("/sendmessage"))
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }
}

fn method_path(api_method: &str) -> String {
    format!("(?i)/bot[^/]+/{}$", api_method)
}

fn bot_me() -> Me {
    serde_json::from_value(json!({
        "id": 987654321,
        "is_bot": true,
        "first_name": "FileLink",
        "username": BOT_USERNAME,
        "can_join_groups": true,
        "can_read_all_group_messages": false,
        "supports_inline_queries": false,
        "can_connect_to_business": false,
        "has_main_web_app": false
    }))
    .unwrap()
}

fn sent_message() -> Value {
    json!({
        "ok": true,
        "result": {
            "message_id": 42,
            "from": { "id": 987654321, "is_bot": true, "first_name": "FileLink" },
            "chat": { "id": USER_ID, "type": "private", "first_name": "Test" },
            "date": 1710072000,
            "text": "ok"
        }
    })
}

/// Private chat message from `user_id` with the given payload fields merged in
fn incoming(user_id: i64, payload: Value) -> Value {
    let mut message = json!({
        "message_id": 1,
        "date": 1710072000,
        "chat": { "id": user_id, "type": "private", "first_name": "Test" },
        "from": { "id": user_id, "is_bot": false, "first_name": "Test" }
    });
    if let (Some(target), Value::Object(fields)) = (message.as_object_mut(), payload) {
        target.extend(fields);
    }
    message
}

fn text_from(user_id: i64, text: &str) -> Value {
    incoming(user_id, json!({ "text": text }))
}

fn document_from(user_id: i64, file_id: &str) -> Value {
    incoming(
        user_id,
        json!({ "document": { "file_id": file_id, "file_unique_id": "doc-unique" } }),
    )
}

#[tokio::test]
async fn test_start_falls_back_to_document_when_photo_is_rejected() {
    let h = HandlerHarness::new().await;
    let code = h.env.store.register_upload(1, "photo-file-id", FileKind::Photo).unwrap();

    h.mount_error_once("sendPhoto", "Bad Request: wrong file identifier/HTTP URL specified")
        .await;
    h.mount_ok("sendDocument").await;

    h.dispatch(text_from(USER_ID, &format!("/start {}", code))).await;

    assert_eq!(h.called_methods().await, vec!["sendphoto", "senddocument"]);
}

#[tokio::test]
async fn test_start_with_document_code_sends_document_once() {
    let h = HandlerHarness::new().await;
    let code = h.env.store.register_upload(1, "doc-file-id", FileKind::Document).unwrap();
    h.mount_ok("sendDocument").await;

    h.dispatch(text_from(USER_ID, &format!("/start {}", code))).await;

    assert_eq!(h.called_methods().await, vec!["senddocument"]);
}

#[tokio::test]
async fn test_start_with_unknown_code_replies_not_found() {
    let h = HandlerHarness::new().await;
    h.mount_ok("sendMessage").await;

    h.dispatch(text_from(USER_ID, "/start NoSuch42")).await;

    let sent = h.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["text"], messages::FILE_NOT_FOUND);
    assert_eq!(sent[0]["chat_id"], USER_ID);
}

#[tokio::test]
async fn test_non_admin_setpremium_is_silent() {
    let h = HandlerHarness::new().await;

    h.dispatch(text_from(USER_ID, "/setpremium 2000 12")).await;

    assert!(h.called_methods().await.is_empty());
    assert!(!h.env.store.is_premium(USER_ID).unwrap());
}

#[tokio::test]
async fn test_admin_setpremium_replies_and_grants() {
    let h = HandlerHarness::new().await;
    h.mount_ok("sendMessage").await;

    h.dispatch(text_from(ADMIN_ID, "/setpremium 2000 1")).await;

    assert!(h.env.store.is_premium(USER_ID).unwrap());
    let sent = h.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["chat_id"], ADMIN_ID);
}

#[tokio::test]
async fn test_upload_over_quota_offers_premium_contact() {
    let h = HandlerHarness::new().await;
    h.env.store.set_setting(SettingKey::FreeCredits, "0").unwrap();
    h.mount_ok("sendMessage").await;

    h.dispatch(document_from(USER_ID, "doc-file-id")).await;

    let sent = h.sent_messages().await;
    assert_eq!(sent.len(), 1);
    let button = &sent[0]["reply_markup"]["inline_keyboard"][0][0];
    assert!(button["text"].as_str().unwrap().contains("Buy Premium"));
    assert_eq!(button["url"], "https://t.me/your_telegram_username");
    assert_eq!(h.env.store.stats().unwrap().total_files, 0);
}

#[tokio::test]
async fn test_upload_replies_with_share_link() {
    let h = HandlerHarness::new().await;
    h.mount_ok("sendMessage").await;

    h.dispatch(document_from(USER_ID, "doc-file-id")).await;

    let sent = h.sent_messages().await;
    assert_eq!(sent.len(), 1);
    let text = sent[0]["text"].as_str().unwrap();
    let prefix = format!("https://t.me/{}?start=", BOT_USERNAME);
    let start = text.find(&prefix).expect("share link in reply") + prefix.len();
    let code: String = text[start..].chars().take_while(char::is_ascii_alphanumeric).collect();

    let link = h.env.store.resolve_code(&code).unwrap().unwrap();
    assert_eq!(link.file_ref, "doc-file-id");
    assert_eq!(link.owner_id, USER_ID);
    assert_eq!(link.file_kind, FileKind::Document);
}

#[tokio::test]
async fn test_status_resends_escaped_after_entity_error() {
    let h = HandlerHarness::new().await;
    h.mount_error_once("sendMessage", "Bad Request: can't parse entities: Character '.' is reserved")
        .await;
    h.mount_ok("sendMessage").await;

    h.dispatch(text_from(USER_ID, "/status")).await;

    let entitlement = h.env.store.check_entitlement(USER_ID).unwrap();
    let original = messages::status_markdown(&entitlement);
    let sent = h.sent_messages().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0]["text"], original.as_str());
    assert_eq!(sent[1]["text"], escape_markdown_v2(&original).as_str());
    assert_eq!(sent[1]["parse_mode"], "MarkdownV2");
}

#[test]
fn test_extract_upload_picks_largest_photo() {
    let message: Message = serde_json::from_value(incoming(
        USER_ID,
        json!({
            "photo": [
                { "file_id": "small", "file_unique_id": "s", "width": 90, "height": 90 },
                { "file_id": "large", "file_unique_id": "l", "width": 1280, "height": 720 },
                { "file_id": "medium", "file_unique_id": "m", "width": 320, "height": 320 }
            ]
        }),
    ))
    .unwrap();

    let upload = extract_upload(&message).unwrap();
    assert_eq!(upload.file_ref, "large");
    assert_eq!(upload.kind, FileKind::Photo);
}

#[test]
fn test_extract_upload_recognises_each_kind() {
    let cases = [
        (
            json!({ "document": { "file_id": "d", "file_unique_id": "du" } }),
            FileKind::Document,
        ),
        (
            json!({ "video": { "file_id": "v", "file_unique_id": "vu", "width": 640, "height": 360, "duration": 5 } }),
            FileKind::Video,
        ),
        (
            json!({ "audio": { "file_id": "a", "file_unique_id": "au", "duration": 30 } }),
            FileKind::Audio,
        ),
    ];

    for (payload, kind) in cases {
        let message: Message = serde_json::from_value(incoming(USER_ID, payload)).unwrap();
        assert_eq!(extract_upload(&message).unwrap().kind, kind);
    }

    let text: Message = serde_json::from_value(text_from(USER_ID, "hello")).unwrap();
    assert!(extract_upload(&text).is_none());
}
