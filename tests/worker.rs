mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{GatedApi, message, signed_in};
use rust_rest_chat::common::{Chat, ChatId, Session, SyncCommand, SyncEvent};
use rust_rest_chat::network::{ChatApi, MockChatApi, SyncWorker};
use rust_rest_chat::storage::SessionStore;
use rust_rest_chat::sync::{ChatState, ChatSyncClient};
use tokio::sync::mpsc;

struct Harness {
    commands: mpsc::Sender<SyncCommand>,
    events: mpsc::Receiver<SyncEvent>,
}

const QUIET: Duration = Duration::from_secs(60);

fn start(session: Session) -> Harness {
    start_with(Arc::new(MockChatApi::new()), session, QUIET)
}

fn start_with(api: Arc<dyn ChatApi>, session: Session, poll_interval: Duration) -> Harness {
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::channel(64);
    let worker = SyncWorker::new(
        ChatSyncClient::new(api),
        session,
        Some(SessionStore::in_memory().unwrap()),
        poll_interval,
        event_tx,
        cmd_rx,
    );
    tokio::spawn(worker.run());

    Harness {
        commands: cmd_tx,
        events: event_rx,
    }
}

impl Harness {
    async fn send(&self, command: SyncCommand) {
        self.commands.send(command).await.unwrap();
    }

    async fn wait_for<F: Fn(&SyncEvent) -> bool>(&mut self, predicate: F) -> SyncEvent {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let event = self.events.recv().await.expect("worker stopped");
                if predicate(&event) {
                    return event;
                }
            }
        })
        .await
        .expect("event never arrived")
    }

    async fn wait_for_state<F: Fn(&ChatState) -> bool>(&mut self, predicate: F) -> ChatState {
        match self
            .wait_for(|event| matches!(event, SyncEvent::StateChanged(state) if predicate(state)))
            .await
        {
            SyncEvent::StateChanged(state) => state,
            _ => unreachable!(),
        }
    }
}

#[tokio::test]
async fn signed_in_worker_loads_chats_on_start() {
    let mut harness = start(signed_in("alice"));

    let state = harness
        .wait_for_state(|state| state.active_chat.is_some())
        .await;
    assert_eq!(state.active_chat, Some(ChatId::from(1)));
    assert_eq!(state.chats[0].name, "General Chat");
}

#[tokio::test]
async fn send_command_clears_compose_and_publishes_messages() {
    let mut harness = start(signed_in("alice"));
    harness
        .wait_for_state(|state| state.active_chat.is_some())
        .await;

    harness
        .send(SyncCommand::SendMessage {
            text: "hello".into(),
            anonymous: false,
        })
        .await;

    harness
        .wait_for(|event| matches!(event, SyncEvent::MessageSent))
        .await;
    let state = harness
        .wait_for_state(|state| !state.messages.is_empty())
        .await;
    assert_eq!(state.messages[0].content, "hello");
    assert_eq!(state.messages[0].sender, "alice");
}

#[tokio::test]
async fn anonymous_worker_waits_for_a_session() {
    let mut harness = start(Session::anonymous());

    harness
        .send(SyncCommand::SetSession(signed_in("bob")))
        .await;

    match harness
        .wait_for(|event| matches!(event, SyncEvent::SessionChanged(_)))
        .await
    {
        SyncEvent::SessionChanged(session) => assert_eq!(session.display_name(), "bob"),
        _ => unreachable!(),
    }
    harness
        .wait_for_state(|state| state.active_chat.is_some())
        .await;
}

#[tokio::test]
async fn logout_resets_session_and_state() {
    let mut harness = start(signed_in("alice"));
    harness
        .wait_for_state(|state| state.active_chat.is_some())
        .await;

    harness.send(SyncCommand::Logout).await;

    match harness
        .wait_for(|event| matches!(event, SyncEvent::SessionChanged(_)))
        .await
    {
        SyncEvent::SessionChanged(session) => assert!(!session.is_authenticated()),
        _ => unreachable!(),
    }
    let state = harness.wait_for_state(|state| state.chats.is_empty()).await;
    assert_eq!(state.active_chat, None);
    assert!(state.messages.is_empty());
}

#[tokio::test]
async fn selection_is_published_before_messages_arrive() {
    let api = Arc::new(GatedApi::new(vec![Chat::new(1, "A"), Chat::new(2, "B")]));
    let _held = [api.gate(), api.gate(), api.gate()];
    let mut harness = start_with(api.clone(), signed_in("alice"), QUIET);

    let state = harness
        .wait_for_state(|state| state.active_chat == Some(ChatId::from(1)))
        .await;
    assert_eq!(state.chats.len(), 2);

    harness.send(SyncCommand::OpenChat(ChatId::from(2))).await;
    let state = tokio::time::timeout(
        Duration::from_secs(1),
        harness.wait_for_state(|state| state.active_chat == Some(ChatId::from(2))),
    )
    .await
    .expect("selection waited for the message fetch");
    assert!(state.messages.is_empty());
}

#[tokio::test(start_paused = true)]
async fn timer_poll_publishes_new_messages() {
    let api = Arc::new(MockChatApi::new());
    let mut harness = start_with(api.clone(), signed_in("alice"), Duration::from_secs(2));
    harness
        .wait_for_state(|state| state.active_chat.is_some())
        .await;

    api.seed_messages(1, vec![message("Bob", "polled in")]);

    let state = harness
        .wait_for_state(|state| !state.messages.is_empty())
        .await;
    assert_eq!(state.messages, vec![message("Bob", "polled in")]);
}
