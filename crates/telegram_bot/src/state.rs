//! Per-chat session state.

use std::{collections::HashMap, sync::Arc};

use store::RecordKind;
use teloxide::types::ChatId;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::wizard::Wizard;

/// What the chat is currently doing.
///
/// At most one mode is active; entering a mode replaces the previous value
/// wholesale, so partial input from an abandoned flow cannot bleed over.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum Mode {
    #[default]
    Idle,
    Collecting(Wizard),
    Editing {
        kind: RecordKind,
        id: i64,
    },
    Browsing {
        kind: RecordKind,
    },
}

/// Menu screens tracked by the navigation history stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MenuScreen {
    Main,
    BalancePeriod,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Session {
    pub mode: Mode,
    /// Table used by the idle fast path; set by the last "add" selection.
    pub entry_kind: RecordKind,
    pub menu_stack: Vec<MenuScreen>,
}

impl Session {
    pub(crate) fn enter_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub(crate) fn push_menu(&mut self, screen: MenuScreen) {
        self.menu_stack.push(screen);
    }

    pub(crate) fn pop_menu(&mut self) -> Option<MenuScreen> {
        self.menu_stack.pop()
    }
}

#[derive(Default)]
struct ChatState {
    session: Session,
    gate: Arc<Mutex<()>>,
}

/// In-memory sessions keyed by chat id. State is lost on restart.
#[derive(Clone, Default)]
pub(crate) struct SessionStore {
    inner: Arc<Mutex<HashMap<ChatId, ChatState>>>,
}

impl SessionStore {
    /// Serializes handling per chat: the returned guard is held for the
    /// whole update, so a second message from the same chat waits until
    /// the first one has finished its store round-trip.
    pub(crate) async fn lock_chat(&self, chat_id: ChatId) -> OwnedMutexGuard<()> {
        let gate = {
            let mut guard = self.inner.lock().await;
            guard.entry(chat_id).or_default().gate.clone()
        };
        gate.lock_owned().await
    }

    pub(crate) async fn get(&self, chat_id: ChatId) -> Session {
        let guard = self.inner.lock().await;
        guard
            .get(&chat_id)
            .map(|state| state.session.clone())
            .unwrap_or_default()
    }

    pub(crate) async fn update<F>(&self, chat_id: ChatId, f: F) -> Session
    where
        F: FnOnce(&mut Session),
    {
        let mut guard = self.inner.lock().await;
        let state = guard.entry(chat_id).or_default();
        f(&mut state.session);
        state.session.clone()
    }

    /// Full reset: mode, entry kind and menu stack all return to default.
    pub(crate) async fn clear(&self, chat_id: ChatId) {
        let mut guard = self.inner.lock().await;
        if let Some(state) = guard.get_mut(&chat_id) {
            state.session = Session::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::Step;

    #[test]
    fn entering_a_mode_replaces_the_previous_one() {
        let mut session = Session::default();
        session.enter_mode(Mode::Collecting(Wizard::new(RecordKind::Expense)));
        session.enter_mode(Mode::Editing {
            kind: RecordKind::Income,
            id: 7,
        });

        assert_eq!(
            session.mode,
            Mode::Editing {
                kind: RecordKind::Income,
                id: 7
            }
        );
    }

    #[test]
    fn menu_stack_is_lifo() {
        let mut session = Session::default();
        session.push_menu(MenuScreen::Main);
        session.push_menu(MenuScreen::BalancePeriod);

        assert_eq!(session.pop_menu(), Some(MenuScreen::BalancePeriod));
        assert_eq!(session.pop_menu(), Some(MenuScreen::Main));
        assert_eq!(session.pop_menu(), None);
    }

    #[tokio::test]
    async fn clear_resets_the_whole_session() {
        let sessions = SessionStore::default();
        let chat_id = ChatId(1);

        sessions
            .update(chat_id, |s| {
                s.entry_kind = RecordKind::Income;
                s.push_menu(MenuScreen::Main);
                s.enter_mode(Mode::Collecting(Wizard::new(RecordKind::Income)));
            })
            .await;
        sessions.clear(chat_id).await;

        let session = sessions.get(chat_id).await;
        assert_eq!(session.mode, Mode::Idle);
        assert_eq!(session.entry_kind, RecordKind::Expense);
        assert!(session.menu_stack.is_empty());
    }

    #[tokio::test]
    async fn wizard_state_survives_updates() {
        let sessions = SessionStore::default();
        let chat_id = ChatId(2);

        sessions
            .update(chat_id, |s| {
                s.enter_mode(Mode::Collecting(Wizard {
                    kind: RecordKind::Expense,
                    step: Step::Description {
                        date: "25.12.2023".to_string(),
                    },
                }));
            })
            .await;

        match sessions.get(chat_id).await.mode {
            Mode::Collecting(wizard) => assert_eq!(
                wizard.step,
                Step::Description {
                    date: "25.12.2023".to_string()
                }
            ),
            other => panic!("expected Collecting, got {other:?}"),
        }
    }
}
