use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::common::{Session, SyncCommand, SyncEvent};
use crate::storage::SessionStore;
use crate::sync::{ChatSyncClient, MessageLoad, SendOutcome};

/// Background loop between the UI and the backend.
///
/// Commands arrive from the UI; each is run on its own task so a slow request
/// never blocks the loop. State changes go back up as [`SyncEvent`]s. The poll
/// timer ticks independently of user activity.
pub struct SyncWorker {
    client: ChatSyncClient,
    session: Session,
    store: Option<SessionStore>,
    poll_interval: Duration,
    event_sender: mpsc::Sender<SyncEvent>,
    command_receiver: mpsc::Receiver<SyncCommand>,
}

impl SyncWorker {
    pub fn new(
        client: ChatSyncClient,
        session: Session,
        store: Option<SessionStore>,
        poll_interval: Duration,
        event_sender: mpsc::Sender<SyncEvent>,
        command_receiver: mpsc::Receiver<SyncCommand>,
    ) -> Self {
        Self {
            client,
            session,
            store,
            poll_interval,
            event_sender,
            command_receiver,
        }
    }

    pub async fn run(mut self) {
        log::info!(
            "Sync loop started as {} (poll every {:?})",
            self.session.display_name(),
            self.poll_interval
        );

        if self.session.is_authenticated() {
            self.spawn_chat_reload();
        }

        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    if let Some(command) = command {
                        self.handle_command(command).await;
                    } else {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.spawn_poll();
                }
            }
        }

        log::info!("Sync loop stopped");
    }

    async fn handle_command(&mut self, command: SyncCommand) {
        match command {
            SyncCommand::LoadChats => self.spawn_chat_reload(),
            SyncCommand::OpenChat(chat_id) => {
                self.client.select_chat(chat_id);
                notify(&self.event_sender, SyncEvent::StateChanged(self.client.snapshot())).await;
                self.spawn_with_snapshot(|client, session| async move {
                    client.load_messages(&session).await;
                });
            }
            SyncCommand::SendMessage { text, anonymous } => {
                let client = self.client.clone();
                let session = self.session.clone();
                let events = self.event_sender.clone();
                tokio::spawn(async move {
                    if client.send_message(&session, &text, anonymous).await
                        == SendOutcome::Completed
                    {
                        notify(&events, SyncEvent::MessageSent).await;
                        notify(&events, SyncEvent::StateChanged(client.snapshot())).await;
                    }
                });
            }
            SyncCommand::CreateChat { name } => {
                let client = self.client.clone();
                let session = self.session.clone();
                let events = self.event_sender.clone();
                tokio::spawn(async move {
                    if client.create_new_chat(&session, &name).await {
                        notify(&events, SyncEvent::ChatCreated).await;
                        notify(&events, SyncEvent::StateChanged(client.snapshot())).await;
                    }
                });
            }
            SyncCommand::AddUserToChat { chat_id, username } => {
                let client = self.client.clone();
                let session = self.session.clone();
                let events = self.event_sender.clone();
                tokio::spawn(async move {
                    if let Some(status) =
                        client.add_user_to_chat(&session, &chat_id, &username).await
                    {
                        notify(&events, SyncEvent::MemberAdded(status)).await;
                        notify(&events, SyncEvent::StateChanged(client.snapshot())).await;
                    }
                });
            }
            SyncCommand::SetSession(session) => {
                if let Some(store) = &self.store {
                    if let Err(err) = store.save_session(&session) {
                        log::warn!("Failed to persist session: {err}");
                    }
                }
                self.session = session;
                self.client.reset();
                notify(&self.event_sender, SyncEvent::SessionChanged(self.session.clone())).await;
                notify(&self.event_sender, SyncEvent::StateChanged(self.client.snapshot())).await;
                if self.session.is_authenticated() {
                    self.spawn_chat_reload();
                }
            }
            SyncCommand::Logout => {
                if let Some(store) = &self.store {
                    if let Err(err) = store.clear() {
                        log::warn!("Failed to clear session store: {err}");
                    }
                }
                log::info!("Logged out {}", self.session.display_name());
                self.session = Session::anonymous();
                self.client.reset();
                notify(&self.event_sender, SyncEvent::SessionChanged(self.session.clone())).await;
                notify(&self.event_sender, SyncEvent::StateChanged(self.client.snapshot())).await;
            }
        }
    }

    fn spawn_poll(&self) {
        let client = self.client.clone();
        let session = self.session.clone();
        let events = self.event_sender.clone();
        let deadline = self.poll_interval;
        tokio::spawn(async move {
            if client.poll(&session, deadline).await == Some(MessageLoad::Applied) {
                notify(&events, SyncEvent::StateChanged(client.snapshot())).await;
            }
        });
    }

    /// Publish the chat list as soon as it arrives, then the messages of the
    /// chat it selected.
    fn spawn_chat_reload(&self) {
        let client = self.client.clone();
        let session = self.session.clone();
        let events = self.event_sender.clone();
        tokio::spawn(async move {
            let selected = client.reload_chat_list(&session).await;
            notify(&events, SyncEvent::StateChanged(client.snapshot())).await;
            if selected.is_some() && client.load_messages(&session).await == MessageLoad::Applied {
                notify(&events, SyncEvent::StateChanged(client.snapshot())).await;
            }
        });
    }

    /// Run `op` on its own task and publish the resulting state.
    fn spawn_with_snapshot<F, Fut>(&self, op: F)
    where
        F: FnOnce(ChatSyncClient, Session) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let client = self.client.clone();
        let session = self.session.clone();
        let events = self.event_sender.clone();
        let work = op(client.clone(), session);
        tokio::spawn(async move {
            work.await;
            notify(&events, SyncEvent::StateChanged(client.snapshot())).await;
        });
    }
}

async fn notify(events: &mpsc::Sender<SyncEvent>, event: SyncEvent) {
    if let Err(err) = events.send(event).await {
        log::debug!("UI no longer listening: {err}");
    }
}
