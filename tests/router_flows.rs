//! End-to-end conversation flows through the router, with the network
//! replaced by a recording outbound and a scripted translator.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lingua_relay::bot::commands::Command;
use lingua_relay::menu::{SelectAction, Token};
use lingua_relay::outbound::{Outbound, OutboundError};
use lingua_relay::relay::RelayLog;
use lingua_relay::router::{Router, Sender};
use lingua_relay::session::{Mode, PendingAction, SessionStore, UserId};
use lingua_relay::translate::{TranslateError, Translator};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Text {
        chat: i64,
        id: i32,
        text: String,
    },
    Html {
        chat: i64,
        text: String,
    },
    Photo {
        chat: i64,
        file: String,
        caption: String,
    },
    Keyboard {
        chat: i64,
        text: String,
        rows: usize,
    },
    Edit {
        chat: i64,
        message_id: i32,
        text: String,
        rows: usize,
    },
}

#[derive(Default)]
struct RecordingOutbound {
    ops: Mutex<Vec<Op>>,
    next_id: AtomicI32,
    fail_for: HashSet<i64>,
}

impl RecordingOutbound {
    fn failing(fail_for: impl IntoIterator<Item = i64>) -> Self {
        Self {
            fail_for: fail_for.into_iter().collect(),
            ..Self::default()
        }
    }

    fn ops(&self) -> Vec<Op> {
        self.ops.lock().expect("ops lock").clone()
    }

    fn texts_to(&self, chat: i64) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Text { chat: c, text, .. } | Op::Html { chat: c, text } if c == chat => {
                    Some(text)
                }
                _ => None,
            })
            .collect()
    }

    fn push(&self, op: Op) {
        self.ops.lock().expect("ops lock").push(op);
    }

    fn bump(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl Outbound for RecordingOutbound {
    async fn send_text(&self, chat: UserId, text: &str) -> Result<i32, OutboundError> {
        if self.fail_for.contains(&chat) {
            return Err(OutboundError::Unavailable("blocked".to_string()));
        }
        let id = self.bump();
        self.push(Op::Text {
            chat,
            id,
            text: text.to_string(),
        });
        Ok(id)
    }

    async fn send_html(&self, chat: UserId, text: &str) -> Result<i32, OutboundError> {
        self.push(Op::Html {
            chat,
            text: text.to_string(),
        });
        Ok(self.bump())
    }

    async fn send_photo(
        &self,
        chat: UserId,
        file_ref: &str,
        caption: &str,
    ) -> Result<i32, OutboundError> {
        if self.fail_for.contains(&chat) {
            return Err(OutboundError::Unavailable("blocked".to_string()));
        }
        self.push(Op::Photo {
            chat,
            file: file_ref.to_string(),
            caption: caption.to_string(),
        });
        Ok(self.bump())
    }

    async fn send_keyboard(
        &self,
        chat: UserId,
        text: &str,
        keyboard: &[Vec<lingua_relay::menu::MenuButton>],
    ) -> Result<i32, OutboundError> {
        self.push(Op::Keyboard {
            chat,
            text: text.to_string(),
            rows: keyboard.len(),
        });
        Ok(self.bump())
    }

    async fn edit_keyboard(
        &self,
        chat: UserId,
        message_id: i32,
        text: &str,
        keyboard: &[Vec<lingua_relay::menu::MenuButton>],
    ) -> Result<(), OutboundError> {
        self.push(Op::Edit {
            chat,
            message_id,
            text: text.to_string(),
            rows: keyboard.len(),
        });
        Ok(())
    }

    async fn send_typing(&self, _chat: UserId) {}
}

#[derive(Default)]
struct FakeTranslator {
    calls: Mutex<Vec<(String, Option<String>, String)>>,
    fail: bool,
}

impl FakeTranslator {
    fn calls(&self) -> Vec<(String, Option<String>, String)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Option<&str>,
        target: &str,
    ) -> Result<String, TranslateError> {
        self.calls.lock().expect("calls lock").push((
            text.to_string(),
            source.map(ToString::to_string),
            target.to_string(),
        ));
        if self.fail {
            return Err(TranslateError::ApiError("scripted failure".to_string()));
        }
        Ok(format!("[{target}] {text}"))
    }
}

struct Fixture {
    router: Router,
    store: Arc<SessionStore>,
    outbound: Arc<RecordingOutbound>,
    translator: Arc<FakeTranslator>,
}

fn fixture(admin: Option<i64>) -> Fixture {
    fixture_with(admin, RecordingOutbound::default(), FakeTranslator::default())
}

fn fixture_with(
    admin: Option<i64>,
    outbound: RecordingOutbound,
    translator: FakeTranslator,
) -> Fixture {
    let store = Arc::new(SessionStore::new("en"));
    let outbound = Arc::new(outbound);
    let translator = Arc::new(translator);
    let router = Router::new(
        Arc::clone(&store),
        Arc::new(RelayLog::with_limits(60, 100)),
        Arc::clone(&translator) as Arc<dyn Translator>,
        Arc::clone(&outbound) as Arc<dyn Outbound>,
        admin,
        Duration::ZERO,
    );
    Fixture {
        router,
        store,
        outbound,
        translator,
    }
}

fn user(id: i64) -> Sender {
    Sender {
        user_id: id,
        chat: id,
        name: format!("User{id}"),
    }
}

// Scenario A: /start, pick a target via the menu, translate.
#[tokio::test]
async fn start_select_translate_flow() {
    let fx = fixture(None);
    let alice = user(1);

    fx.router
        .handle_command(&alice, Command::Start, None)
        .await
        .expect("start");
    assert_eq!(fx.store.get(1).await.target, "en");

    let token = Token::Select {
        action: SelectAction::Target,
        code: "fr".to_string(),
    };
    fx.router
        .handle_callback(&alice, Some(10), &token.encode())
        .await
        .expect("select");
    assert_eq!(fx.store.get(1).await.target, "fr");

    fx.router
        .handle_text(&alice, "hello", None)
        .await
        .expect("translate");

    assert_eq!(
        fx.translator.calls(),
        vec![("hello".to_string(), None, "French".to_string())]
    );
    let replies = fx.outbound.texts_to(1);
    assert!(replies.iter().any(|t| t == "[French] hello"), "{replies:?}");
}

// Scenario B: support relay round trip with admin correlation.
#[tokio::test]
async fn support_relay_round_trip() {
    let admin_id = 999;
    let fx = fixture(Some(admin_id));
    let alice = user(1);

    fx.router
        .handle_command(&alice, Command::Support, None)
        .await
        .expect("support");
    let session = fx.store.get(1).await;
    assert_eq!(session.mode, Mode::SupportRelay);
    assert_eq!(session.pending, Some(PendingAction::AwaitingSupportMessage));

    fx.router
        .handle_text(&alice, "help me", None)
        .await
        .expect("relay");

    // The relayed message is tagged with the sender's identity
    let relayed = fx.outbound.texts_to(admin_id);
    assert_eq!(relayed.len(), 1);
    assert!(relayed[0].contains("help me"));
    assert!(relayed[0].contains("id 1"));

    // The relay consumed the pending action
    let session = fx.store.get(1).await;
    assert_eq!(session.mode, Mode::Translate);
    assert_eq!(session.pending, None);

    let relayed_id = fx
        .outbound
        .ops()
        .into_iter()
        .find_map(|op| match op {
            Op::Text { chat, id, .. } if chat == admin_id => Some(id),
            _ => None,
        })
        .expect("relayed message id");

    fx.router
        .handle_text(&user(admin_id), "we are on it", Some(relayed_id))
        .await
        .expect("admin reply");

    let replies = fx.outbound.texts_to(1);
    assert!(
        replies.iter().any(|t| t.contains("we are on it")),
        "{replies:?}"
    );
}

// Scenario C: /broadcast from a non-admin is denied without fan-out.
#[tokio::test]
async fn broadcast_denied_for_non_admin() {
    let fx = fixture(Some(999));
    for id in [1, 2, 3] {
        fx.store.get(id).await;
    }

    fx.router
        .handle_command(&user(1), Command::Broadcast("hello".to_string()), None)
        .await
        .expect("broadcast");

    let ops = fx.outbound.ops();
    assert_eq!(ops.len(), 1, "{ops:?}");
    assert!(fx.outbound.texts_to(1)[0].contains("administrator only"));
    assert!(fx.outbound.texts_to(2).is_empty());
    assert!(fx.outbound.texts_to(3).is_empty());
}

#[tokio::test]
async fn admin_commands_fail_closed_without_admin() {
    let fx = fixture(None);
    for cmd in [
        Command::Status,
        Command::Broadcast("hello".to_string()),
    ] {
        fx.router
            .handle_command(&user(42), cmd, None)
            .await
            .expect("command");
    }
    let replies = fx.outbound.texts_to(42);
    assert_eq!(replies.len(), 2);
    assert!(replies.iter().all(|t| t.contains("administrator only")));
}

#[tokio::test]
async fn broadcast_counts_and_isolates_failures() {
    let admin_id = 999;
    let fx = fixture_with(
        Some(admin_id),
        RecordingOutbound::failing([2]),
        FakeTranslator::default(),
    );
    for id in [1, 2, 3] {
        fx.store.get(id).await;
    }

    fx.router
        .handle_command(&user(admin_id), Command::Broadcast("ping".to_string()), None)
        .await
        .expect("broadcast");

    assert_eq!(fx.outbound.texts_to(1), vec!["ping".to_string()]);
    assert!(fx.outbound.texts_to(2).is_empty());
    assert_eq!(fx.outbound.texts_to(3), vec!["ping".to_string()]);

    let report = fx
        .outbound
        .texts_to(admin_id)
        .into_iter()
        .find(|t| t.contains("Broadcast finished"))
        .expect("report");
    assert!(report.contains("2 delivered"), "{report}");
    assert!(report.contains("1 failed"), "{report}");
}

#[tokio::test]
async fn broadcast_with_photo_payload() {
    let admin_id = 999;
    let fx = fixture(Some(admin_id));
    fx.store.get(1).await;

    fx.router
        .handle_command(
            &user(admin_id),
            Command::Broadcast("caption".to_string()),
            Some("file-abc".to_string()),
        )
        .await
        .expect("broadcast");

    let photo = fx
        .outbound
        .ops()
        .into_iter()
        .find_map(|op| match op {
            Op::Photo { chat, file, caption } if chat == 1 => Some((file, caption)),
            _ => None,
        })
        .expect("photo delivery");
    assert_eq!(photo, ("file-abc".to_string(), "caption".to_string()));
}

#[tokio::test]
async fn navigation_edits_in_place() {
    let fx = fixture(None);
    let alice = user(1);

    let token = Token::Page {
        action: SelectAction::Target,
        index: 1,
    };
    fx.router
        .handle_callback(&alice, Some(7), &token.encode())
        .await
        .expect("page");

    let ops = fx.outbound.ops();
    assert_eq!(ops.len(), 1, "{ops:?}");
    assert!(matches!(
        &ops[0],
        Op::Edit { chat: 1, message_id: 7, .. }
    ));
    assert_eq!(
        fx.store.get(1).await.pending,
        Some(PendingAction::ChoosingTarget)
    );
}

#[tokio::test]
async fn malformed_and_stale_tokens_are_no_ops() {
    let fx = fixture(None);
    let alice = user(1);
    let before = fx.store.get(1).await;

    for data in ["sel:dst", "nonsense", "sel:dst:zz", "sel:dst:auto"] {
        fx.router
            .handle_callback(&alice, Some(3), data)
            .await
            .expect("callback");
    }

    assert!(fx.outbound.ops().is_empty());
    assert_eq!(fx.store.get(1).await, before);
}

#[tokio::test]
async fn support_unavailable_without_admin() {
    let fx = fixture(None);
    let alice = user(1);

    fx.router
        .handle_command(&alice, Command::Support, None)
        .await
        .expect("support");

    let replies = fx.outbound.texts_to(1);
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("not available"));
    // The message was not silently dropped into a dead mode
    assert_eq!(fx.store.get(1).await.mode, Mode::Translate);
}

#[tokio::test]
async fn translation_failure_becomes_reply() {
    let fx = fixture_with(
        None,
        RecordingOutbound::default(),
        FakeTranslator {
            fail: true,
            ..FakeTranslator::default()
        },
    );
    let alice = user(1);

    fx.router
        .handle_text(&alice, "hello", None)
        .await
        .expect("translate");

    let replies = fx.outbound.texts_to(1);
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("Translation failed"), "{replies:?}");
    // The upstream detail never reaches the user
    assert!(!replies[0].contains("scripted failure"));
}

#[tokio::test]
async fn source_selection_feeds_translator_hint() {
    let fx = fixture(None);
    let alice = user(1);

    let token = Token::Select {
        action: SelectAction::Source,
        code: "am".to_string(),
    };
    fx.router
        .handle_callback(&alice, Some(1), &token.encode())
        .await
        .expect("select");

    fx.router
        .handle_text(&alice, "ሰላም", None)
        .await
        .expect("translate");

    assert_eq!(
        fx.translator.calls(),
        vec![(
            "ሰላም".to_string(),
            Some("Amharic".to_string()),
            "English".to_string()
        )]
    );
}

#[tokio::test]
async fn unknown_slash_command_is_ignored() {
    let fx = fixture(None);
    fx.router
        .handle_text(&user(1), "/doesnotexist", None)
        .await
        .expect("text");
    assert!(fx.outbound.ops().is_empty());
    assert!(fx.translator.calls().is_empty());
}
