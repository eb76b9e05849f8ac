//! End-to-end tests: JSON database on disk through the dispatcher to replies
//! Run with: cargo test --test diagnose_flow_test

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use diagnoser_bot::application::errors::BotError;
use diagnoser_bot::application::messaging::{AudienceMiddleware, MessageDispatcher, MessageParser};
use diagnoser_bot::application::services::diagnosis_service::{DISCLAIMER, INSUFFICIENT_INFORMATION};
use diagnoser_bot::application::services::{CommandService, DiagnosisService, MessageService};
use diagnoser_bot::domain::entities::{Message, User};
use diagnoser_bot::domain::traits::{Bot, BotInfo};
use diagnoser_bot::infrastructure::storage;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn sample_database() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/diseases.json")
}

fn dispatcher_for(path: &std::path::Path) -> MessageDispatcher {
    let database = storage::load_database(path).expect("Should load database");
    let mut commands = CommandService::new("?");
    commands.register_defaults(DiagnosisService::new(Arc::new(database)));

    MessageDispatcher::new(MessageParser::new("?").with_mention("diagnoser_bot"), commands)
        .with_middleware(AudienceMiddleware::new(false))
}

fn group_message(text: &str) -> Message {
    Message::from_text("clinic", text)
        .with_sender(User::new("100").with_username("patient"))
        .in_group(true)
}

fn reply(dispatcher: &MessageDispatcher, text: &str) -> Option<String> {
    dispatcher.process(group_message(text)).expect("Should process message")
}

/// Diagnosis over the bundled sample database
#[test]
fn test_diagnose_sample_database() {
    ensure_init();
    let dispatcher = dispatcher_for(&sample_database());

    let answer = reply(&dispatcher, "?diagnose fever cough").expect("Should reply");

    assert_eq!(
        answer,
        format!(
            "You might have: influenza, common cold, strep throat, chickenpox, food poisoning\n{}",
            DISCLAIMER
        )
    );
}

/// Single symptom shared by several diseases
#[test]
fn test_diagnose_single_symptom() {
    ensure_init();
    let dispatcher = dispatcher_for(&sample_database());

    let answer = reply(&dispatcher, "@diagnoser_bot diagnose HEADACHE").expect("Should reply");

    assert!(answer.starts_with("You might have: strep throat, migraine, dehydration, influenza\n"),
        "Unexpected reply: {}", answer);
}

/// Multi-word symptoms and disease names
#[test]
fn test_multi_word_names() {
    ensure_init();
    let dispatcher = dispatcher_for(&sample_database());

    let answer = reply(&dispatcher, "?diagnose sore throat, swollen glands").expect("Should reply");
    assert!(answer.starts_with("You might have: strep throat"), "Unexpected reply: {}", answer);

    let answer = reply(&dispatcher, "?info Common Cold").expect("Should reply");
    assert_eq!(
        answer,
        "Symptoms for common cold include: cough, sneeze, congestion, sore throat\n\
         Treatments include: rest, fluids, decongestants."
    );
}

/// Replies that are not diagnoses
#[test]
fn test_fallback_replies() {
    ensure_init();
    let dispatcher = dispatcher_for(&sample_database());

    assert_eq!(reply(&dispatcher, "?diagnose").as_deref(), Some(INSUFFICIENT_INFORMATION));
    assert_eq!(reply(&dispatcher, "?diagnose purple").as_deref(), Some(INSUFFICIENT_INFORMATION));
    assert_eq!(
        reply(&dispatcher, "?info scurvy").as_deref(),
        Some("scurvy was not found in the database.")
    );
    assert!(reply(&dispatcher, "?help").expect("Should reply").contains("?info <disease>"));
    assert!(reply(&dispatcher, "?operate now").is_none());
    assert!(reply(&dispatcher, "fever cough").is_none());
}

/// A record without symptoms in the file must not break ranking
#[test]
fn test_database_with_empty_record() {
    ensure_init();
    let mut file = tempfile::NamedTempFile::new().expect("Should create temp file");
    file.write_all(br#"{"flu": [["fever", "cough"], ["rest"]], "unknown": [[], ["wait"]]}"#)
        .expect("Should write database");

    let dispatcher = dispatcher_for(file.path());

    let answer = reply(&dispatcher, "?diagnose cough").expect("Should reply");
    assert!(answer.starts_with("You might have: flu\n"));
    assert_eq!(
        reply(&dispatcher, "?info unknown").as_deref(),
        Some("Symptoms for unknown include: none listed\nTreatments include: wait.")
    );
}

/// Malformed files are rejected at load time
#[test]
fn test_malformed_database_fails_to_load() {
    ensure_init();
    let mut file = tempfile::NamedTempFile::new().expect("Should create temp file");
    file.write_all(b"{\"flu\": [\"fever\"]").expect("Should write database");

    assert!(storage::load_database(file.path()).is_err());
}

/// Records replies instead of sending them anywhere
#[derive(Default)]
struct RecordingBot {
    replies: Mutex<Vec<String>>,
}

#[async_trait]
impl Bot for RecordingBot {
    async fn start(&self) -> Result<(), BotError> {
        Ok(())
    }

    async fn poll_messages(&self) -> Result<Option<Vec<Message>>, BotError> {
        Ok(None)
    }

    async fn send_message(&self, _chat_id: &str, text: &str) -> Result<String, BotError> {
        self.replies.lock().unwrap().push(text.to_string());
        Ok("1".to_string())
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: "1".to_string(),
            name: "diagnoser-bot".to_string(),
            username: "diagnoser_bot".to_string(),
        }
    }
}

/// Concurrent requests share one read-only database
#[tokio::test]
async fn test_concurrent_messages() {
    ensure_init();
    let service = Arc::new(MessageService::new(
        RecordingBot::default(),
        dispatcher_for(&sample_database()),
    ));

    let mut handles = Vec::new();
    for text in ["?diagnose rash", "?info migraine", "?diagnose thirst", "?help"] {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service.process(group_message(text)).await;
        }));
    }
    for handle in handles {
        handle.await.expect("Handler should not panic");
    }

    let replies = service.bot().replies.lock().unwrap().clone();
    assert_eq!(replies.len(), 4);
    assert!(replies.iter().any(|r| r.starts_with("You might have: chickenpox")));
    assert!(replies.iter().any(|r| r.starts_with("You might have: dehydration")));
    assert!(replies.iter().any(|r| r.starts_with("Symptoms for migraine include")));
}
