use std::time::Instant;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rust_i18n::t;
use thiserror::Error;

use crate::config::{Config, TransportKind};
use crate::model::set::resolve_title;
use crate::model::{Category, FlashcardSet, ProgressKey, ProgressMap};
use crate::remote::prompt::{self, SourceMode};
use crate::remote::reply::{self, GeneratedDeck, ReplyError};
use crate::remote::{ModelCall, ModelClient, RemoteError};
use crate::session::{ChatSession, DelayedEvent, StudyDeck, Timers};
use crate::store::{Library, Storage, StorageError};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Which flavour of the app is running: generated sets or bundled categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    Generator,
    Categories,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppMode {
    Create,
    Loading,
    Study,
    History,
    Home,
    Cards,
}

impl AppMode {
    pub fn is_card_mode(self) -> bool {
        matches!(self, AppMode::Study | AppMode::Cards)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    MissingTopic,
    MissingCredential,
    CredentialRejected,
    ProxyFailure,
    NetworkFailure,
    MalformedReply,
    Storage,
    Settings,
}

/// A blocking, dismissable message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn storage(err: &StorageError) -> Self {
        let message = match err {
            StorageError::QuotaExceeded => t!("notice.storage_quota").into_owned(),
            other => t!("notice.storage", detail = other.to_string()).into_owned(),
        };
        Self::new(NoticeKind::Storage, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Reply(#[from] ReplyError),
}

#[derive(Debug, Clone)]
pub enum Action {
    Submit,
    ToggleSourceMode,
    GenerationFinished {
        seq: u64,
        result: Result<GeneratedDeck, GenerationError>,
    },
    Navigate(isize),
    Flip,
    Save,
    NewTopic,
    OpenHistory,
    HistoryMove(isize),
    OpenSavedSet,
    RequestDelete(String),
    ClearDeleteConfirm,
    Back,
    CategoryMove(isize),
    OpenCategory(usize),
    ToggleKnown,
    Shuffle,
    ResetProgress,
    OpenChat,
    CloseChat,
    SendChat,
    ChatFinished {
        seq: u64,
        result: Result<String, RemoteError>,
    },
    OpenSettings,
    SettingsMove(isize),
    SettingsToggleTransport,
    SaveSettings,
    CloseSettings,
    SettingsSaveFailed(String),
    DismissNotice,
    Quit,
}

/// Work the controller hands to the runtime. Network effects run off the
/// UI thread and come back as an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Generate { seq: u64, call: ModelCall },
    Chat { seq: u64, call: ModelCall },
    PersistConfig(Box<Config>),
}

/// Run a network effect to completion. Returns `None` for local effects.
pub fn execute(effect: &Effect, client: &dyn ModelClient) -> Option<Action> {
    match effect {
        Effect::Generate { seq, call } => {
            let result = client
                .send(call)
                .map_err(GenerationError::from)
                .and_then(|response| {
                    reply::parse_reply(&response.text()).map_err(GenerationError::from)
                });
            Some(Action::GenerationFinished { seq: *seq, result })
        }
        Effect::Chat { seq, call } => {
            let result = client.send(call).map(|response| response.text());
            Some(Action::ChatFinished { seq: *seq, result })
        }
        Effect::PersistConfig(_) => None,
    }
}

pub const SETTINGS_FIELDS: usize = 2;

pub struct SettingsPanel {
    pub selected: usize,
    pub transport: TransportKind,
    pub api_key: LineInput,
}

impl SettingsPanel {
    fn from_config(config: &Config, selected: usize) -> Self {
        Self {
            selected,
            transport: config.transport,
            api_key: LineInput::new(&config.api_key),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct PendingGeneration {
    seq: u64,
    credential: bool,
}

pub struct App<S: Storage> {
    pub variant: Variant,
    pub mode: AppMode,
    pub config: Config,
    pub theme: Theme,
    pub topic: LineInput,
    pub source_mode: SourceMode,
    pub deck: Option<StudyDeck>,
    pub generated_title: Option<String>,
    pub is_saved: bool,
    pub history: Vec<FlashcardSet>,
    pub history_selected: usize,
    pub armed_delete: Option<String>,
    pub categories: Vec<Category>,
    pub category_selected: usize,
    pub active_category: Option<String>,
    pub progress: ProgressMap,
    pub chat: ChatSession,
    pub settings: Option<SettingsPanel>,
    pub notice: Option<Notice>,
    pub status: Option<String>,
    pub should_quit: bool,
    library: Library<S>,
    timers: Timers,
    generation_seq: u64,
    pending_generation: Option<PendingGeneration>,
    rng: SmallRng,
}

impl<S: Storage> App<S> {
    pub fn new(variant: Variant, config: Config, storage: S) -> Self {
        let library = Library::new(storage);
        let theme = Theme::load(&config.theme).unwrap_or_default();

        let mut notice = None;
        let progress = library.load_progress().unwrap_or_else(|e| {
            log::warn!("could not load progress: {e}");
            notice = Some(Notice::storage(&e));
            ProgressMap::default()
        });

        let mode = match variant {
            Variant::Generator => AppMode::Create,
            Variant::Categories => AppMode::Home,
        };

        Self {
            variant,
            mode,
            config,
            theme,
            topic: LineInput::new(""),
            source_mode: SourceMode::Topic,
            deck: None,
            generated_title: None,
            is_saved: false,
            history: Vec::new(),
            history_selected: 0,
            armed_delete: None,
            categories: Category::load_all(),
            category_selected: 0,
            active_category: None,
            progress,
            chat: ChatSession::new(t!("chat.greeting")),
            settings: None,
            notice,
            status: None,
            should_quit: false,
            library,
            timers: Timers::default(),
            generation_seq: 0,
            pending_generation: None,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn library(&self) -> &Library<S> {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut Library<S> {
        &mut self.library
    }

    pub fn is_animating(&self) -> bool {
        self.deck.as_ref().is_some_and(StudyDeck::is_animating)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    fn home_mode(&self) -> AppMode {
        match self.variant {
            Variant::Generator => AppMode::Create,
            Variant::Categories => AppMode::Home,
        }
    }

    pub fn dispatch(&mut self, action: Action, now: Instant) -> Option<Effect> {
        let before = self.mode;
        let effect = self.apply(action, now);
        if self.mode != before {
            log::debug!("mode {before:?} -> {:?}", self.mode);
        }
        effect
    }

    fn apply(&mut self, action: Action, now: Instant) -> Option<Effect> {
        if !matches!(
            action,
            Action::GenerationFinished { .. } | Action::ChatFinished { .. }
        ) {
            self.status = None;
        }

        match action {
            Action::Submit => return self.submit(),
            Action::ToggleSourceMode => {
                if self.mode == AppMode::Create {
                    self.source_mode = self.source_mode.toggled();
                }
            }
            Action::GenerationFinished { seq, result } => self.finish_generation(seq, result),
            Action::Navigate(delta) => self.navigate(delta, now),
            Action::Flip => self.flip(now),
            Action::Save => self.save(),
            Action::NewTopic => self.new_topic(),
            Action::OpenHistory => self.open_history(),
            Action::HistoryMove(delta) => self.move_history_selection(delta),
            Action::OpenSavedSet => self.open_saved_set(),
            Action::RequestDelete(id) => self.request_delete(&id),
            Action::ClearDeleteConfirm => self.armed_delete = None,
            Action::Back => self.back(),
            Action::CategoryMove(delta) => self.move_category_selection(delta),
            Action::OpenCategory(index) => self.open_category(index),
            Action::ToggleKnown => self.toggle_known(),
            Action::Shuffle => self.shuffle(),
            Action::ResetProgress => self.reset_progress(),
            Action::OpenChat => {
                if self.variant == Variant::Categories
                    && matches!(self.mode, AppMode::Home | AppMode::Cards)
                {
                    self.chat.open = true;
                }
            }
            Action::CloseChat => self.chat.open = false,
            Action::SendChat => return self.send_chat(),
            Action::ChatFinished { seq, result } => self.finish_chat(seq, result),
            Action::OpenSettings => self.open_settings(0),
            Action::SettingsMove(delta) => {
                if let Some(panel) = self.settings.as_mut() {
                    panel.selected = panel
                        .selected
                        .saturating_add_signed(delta)
                        .min(SETTINGS_FIELDS - 1);
                }
            }
            Action::SettingsToggleTransport => {
                if let Some(panel) = self.settings.as_mut() {
                    panel.transport = panel.transport.toggled();
                }
            }
            Action::SaveSettings => return self.save_settings(),
            Action::CloseSettings => self.settings = None,
            Action::SettingsSaveFailed(detail) => {
                self.notice = Some(Notice::new(
                    NoticeKind::Settings,
                    t!("notice.settings_failed", detail = detail),
                ));
            }
            Action::DismissNotice => self.notice = None,
            Action::Quit => {
                self.leave_card_mode();
                self.should_quit = true;
            }
        }
        None
    }

    /// Fire due settle timers.
    pub fn tick(&mut self, now: Instant) {
        for event in self.timers.take_due(now) {
            let Some(deck) = self.deck.as_mut() else {
                continue;
            };
            match event {
                DelayedEvent::NavSettle { delta } => deck.finish_navigation(delta),
                DelayedEvent::FlipSettle => deck.release(),
            }
        }
    }

    /// Cancel pending transitions so no lock outlives the card screen.
    fn leave_card_mode(&mut self) {
        self.timers.cancel_all();
        if let Some(deck) = self.deck.as_mut() {
            deck.release();
        }
    }

    // ── generation ──────────────────────────────────────────────────────

    fn submit(&mut self) -> Option<Effect> {
        if self.mode != AppMode::Create {
            return None;
        }
        if self.topic.is_blank() {
            self.notice = Some(Notice::new(
                NoticeKind::MissingTopic,
                t!("notice.missing_topic"),
            ));
            return None;
        }
        let credential = self.config.transport == TransportKind::Credential;
        if credential && !self.config.has_credential() {
            self.notice = Some(Notice::new(
                NoticeKind::MissingCredential,
                t!("notice.missing_credential"),
            ));
            self.open_settings(1);
            return None;
        }

        let body = prompt::generation_request(
            self.source_mode,
            self.topic.value(),
            self.config.card_count,
            &self.config.model,
            self.config.max_tokens,
        );
        self.generation_seq += 1;
        let seq = self.generation_seq;
        self.pending_generation = Some(PendingGeneration { seq, credential });
        self.mode = AppMode::Loading;
        log::info!(
            "requesting generation #{seq} ({:?}, {})",
            self.source_mode,
            if credential { "credential" } else { "proxy" }
        );
        Some(Effect::Generate {
            seq,
            call: ModelCall {
                transport: self.config.transport(),
                body,
            },
        })
    }

    fn finish_generation(&mut self, seq: u64, result: Result<GeneratedDeck, GenerationError>) {
        let pending = match self.pending_generation {
            Some(p) if p.seq == seq && self.mode == AppMode::Loading => p,
            _ => {
                log::warn!("dropping stale generation result #{seq}");
                return;
            }
        };
        self.pending_generation = None;

        let outcome = result.and_then(|generated| {
            StudyDeck::new(generated.cards)
                .map(|deck| (deck, generated.title))
                .ok_or(GenerationError::Reply(ReplyError::NoCards))
        });

        match outcome {
            Ok((deck, title)) => {
                log::info!("generation #{seq} produced {} cards", deck.len());
                self.deck = Some(deck);
                self.generated_title = title;
                self.is_saved = false;
                self.mode = AppMode::Study;
            }
            Err(e) => {
                log::warn!("generation #{seq} failed: {e}");
                self.deck = None;
                self.generated_title = None;
                self.mode = AppMode::Create;
                self.notice = Some(generation_notice(&e, pending.credential));
            }
        }
    }

    // ── card navigation ─────────────────────────────────────────────────

    fn navigate(&mut self, delta: isize, now: Instant) {
        if !self.mode.is_card_mode() {
            return;
        }
        let settle = self.config.nav_settle();
        if let Some(deck) = self.deck.as_mut() {
            if deck.begin_navigation(delta) {
                self.timers
                    .schedule(DelayedEvent::NavSettle { delta }, now + settle);
            }
        }
    }

    fn flip(&mut self, now: Instant) {
        let settle = self.config.flip_settle();
        let Some(deck) = self.deck.as_mut() else {
            return;
        };
        match self.mode {
            AppMode::Study => {
                if deck.begin_flip() {
                    self.timers.schedule(DelayedEvent::FlipSettle, now + settle);
                }
            }
            AppMode::Cards => deck.flip(),
            _ => {}
        }
    }

    // ── saving and history ──────────────────────────────────────────────

    fn save(&mut self) {
        if self.mode != AppMode::Study || self.is_saved {
            return;
        }
        let Some(deck) = self.deck.as_ref() else {
            return;
        };
        let title = resolve_title(
            self.generated_title.as_deref(),
            self.topic.value(),
            &t!("set.default_title"),
        );
        let set = FlashcardSet::new(&title, deck.cards().to_vec(), Utc::now());
        match self.library.save_set(set) {
            Ok(saved) => {
                self.is_saved = true;
                self.status = Some(t!("notice.saved", title = saved.title).into_owned());
            }
            Err(e) => {
                log::warn!("save failed: {e}");
                self.notice = Some(Notice::storage(&e));
            }
        }
    }

    fn new_topic(&mut self) {
        if self.mode != AppMode::Study {
            return;
        }
        self.leave_card_mode();
        self.deck = None;
        self.generated_title = None;
        self.is_saved = false;
        self.topic.clear();
        self.mode = AppMode::Create;
    }

    fn open_history(&mut self) {
        if !matches!(self.mode, AppMode::Create | AppMode::Study | AppMode::Home) {
            return;
        }
        self.leave_card_mode();
        self.history = self.library.list_sets().unwrap_or_else(|e| {
            log::warn!("could not list saved sets: {e}");
            self.notice = Some(Notice::storage(&e));
            Vec::new()
        });
        self.history_selected = 0;
        self.armed_delete = None;
        self.mode = AppMode::History;
    }

    fn move_history_selection(&mut self, delta: isize) {
        if self.mode != AppMode::History {
            return;
        }
        self.armed_delete = None;
        if self.history.is_empty() {
            self.history_selected = 0;
            return;
        }
        self.history_selected = self
            .history_selected
            .saturating_add_signed(delta)
            .min(self.history.len() - 1);
    }

    pub fn selected_history_id(&self) -> Option<&str> {
        self.history
            .get(self.history_selected)
            .map(|set| set.id.as_str())
    }

    fn open_saved_set(&mut self) {
        if self.mode != AppMode::History {
            return;
        }
        self.armed_delete = None;
        let Some(set) = self.history.get(self.history_selected) else {
            return;
        };
        if let Some(deck) = StudyDeck::new(set.cards.clone()) {
            self.generated_title = Some(set.title.clone());
            self.deck = Some(deck);
            self.is_saved = true;
            self.mode = AppMode::Study;
        }
    }

    /// First call arms `id`, a second call on the same id deletes it. Arming
    /// a different id replaces the previous one.
    fn request_delete(&mut self, id: &str) {
        if self.mode != AppMode::History || !self.history.iter().any(|s| s.id == id) {
            return;
        }
        if self.armed_delete.as_deref() != Some(id) {
            self.armed_delete = Some(id.to_string());
            return;
        }
        match self.library.delete_set(id) {
            Ok(()) => {
                self.history.retain(|s| s.id != id);
                self.armed_delete = None;
                self.history_selected = self
                    .history_selected
                    .min(self.history.len().saturating_sub(1));
            }
            Err(e) => {
                log::warn!("delete of {id} failed: {e}");
                self.notice = Some(Notice::storage(&e));
            }
        }
    }

    fn back(&mut self) {
        match self.mode {
            AppMode::History => {
                self.armed_delete = None;
                self.deck = None;
                self.mode = self.home_mode();
            }
            AppMode::Study | AppMode::Cards => {
                self.leave_card_mode();
                self.deck = None;
                self.active_category = None;
                self.mode = self.home_mode();
            }
            _ => {}
        }
    }

    // ── categories and progress ─────────────────────────────────────────

    fn move_category_selection(&mut self, delta: isize) {
        if self.mode != AppMode::Home || self.categories.is_empty() {
            return;
        }
        self.category_selected = self
            .category_selected
            .saturating_add_signed(delta)
            .min(self.categories.len() - 1);
    }

    fn open_category(&mut self, index: usize) {
        if self.mode != AppMode::Home {
            return;
        }
        let Some(category) = self.categories.get(index) else {
            return;
        };
        if let Some(deck) = StudyDeck::with_ids(category.flashcards(), category.card_ids()) {
            self.active_category = Some(category.id.clone());
            self.category_selected = index;
            self.deck = Some(deck);
            self.mode = AppMode::Cards;
        }
    }

    /// Unknown cards become known and the deck advances (wrapping); known
    /// cards become unknown in place. The map is persisted immediately.
    fn toggle_known(&mut self) {
        if self.mode != AppMode::Cards {
            return;
        }
        let (Some(deck), Some(category)) = (self.deck.as_mut(), self.active_category.as_deref())
        else {
            return;
        };
        if deck.is_animating() {
            return;
        }
        let key = ProgressKey::new(category, deck.current_id());
        let known = !self.progress.is_known(&key);
        self.progress.set_known(&key, known);

        if let Err(e) = self.library.save_progress(&self.progress) {
            log::warn!("could not persist progress for {key}: {e}");
            self.progress.set_known(&key, !known);
            self.notice = Some(Notice::storage(&e));
            return;
        }
        if known {
            deck.advance_wrapping();
        }
    }

    fn shuffle(&mut self) {
        if self.mode != AppMode::Cards {
            return;
        }
        if let Some(deck) = self.deck.as_mut() {
            if !deck.is_animating() {
                deck.shuffle(&mut self.rng);
            }
        }
    }

    fn reset_progress(&mut self) {
        if !matches!(self.mode, AppMode::Home | AppMode::Cards) {
            return;
        }
        let previous = std::mem::take(&mut self.progress);
        if let Err(e) = self.library.save_progress(&self.progress) {
            log::warn!("could not reset progress: {e}");
            self.progress = previous;
            self.notice = Some(Notice::storage(&e));
        }
    }

    pub fn is_current_known(&self) -> bool {
        match (self.deck.as_ref(), self.active_category.as_deref()) {
            (Some(deck), Some(category)) => self
                .progress
                .is_known(&ProgressKey::new(category, deck.current_id())),
            _ => false,
        }
    }

    // ── chat ────────────────────────────────────────────────────────────

    fn send_chat(&mut self) -> Option<Effect> {
        if !self.chat.open {
            return None;
        }
        if self.config.transport == TransportKind::Credential && !self.config.has_credential() {
            self.notice = Some(Notice::new(
                NoticeKind::MissingCredential,
                t!("notice.missing_credential"),
            ));
            self.open_settings(1);
            return None;
        }
        let text = self.chat.input.value().to_string();
        let (seq, transcript) = self.chat.begin_send(&text)?;
        self.chat.input.clear();

        let current = match self.mode {
            AppMode::Cards => self.deck.as_ref().map(StudyDeck::current),
            _ => None,
        };
        let body = prompt::chat_request(
            transcript,
            current,
            &self.config.model,
            self.config.max_tokens,
        );
        Some(Effect::Chat {
            seq,
            call: ModelCall {
                transport: self.config.transport(),
                body,
            },
        })
    }

    fn finish_chat(&mut self, seq: u64, result: Result<String, RemoteError>) {
        let bubble = match result {
            Ok(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Ok(_) => Err(t!("chat.error_api", detail = "empty reply").into_owned()),
            Err(RemoteError::Api(message)) => {
                Err(t!("chat.error_api", detail = message).into_owned())
            }
            Err(RemoteError::Http { status, message }) => Err(t!(
                "chat.error_api",
                detail = format!("HTTP {status}: {message}")
            )
            .into_owned()),
            Err(e) => {
                log::warn!("chat request #{seq} failed: {e}");
                Err(t!("chat.error_network").into_owned())
            }
        };
        if !self.chat.finish(seq, bubble) {
            log::warn!("dropping stale chat reply #{seq}");
        }
    }

    // ── settings ────────────────────────────────────────────────────────

    fn open_settings(&mut self, selected: usize) {
        if matches!(self.mode, AppMode::Create | AppMode::Home | AppMode::Cards) {
            self.settings = Some(SettingsPanel::from_config(&self.config, selected));
        }
    }

    fn save_settings(&mut self) -> Option<Effect> {
        let panel = self.settings.take()?;
        self.config.transport = panel.transport;
        self.config.api_key = panel.api_key.value().trim().to_string();
        log::info!("transport set to {:?}", self.config.transport);
        Some(Effect::PersistConfig(Box::new(self.config.clone())))
    }
}

fn generation_notice(err: &GenerationError, credential: bool) -> Notice {
    match err {
        GenerationError::Reply(e) => Notice::new(
            NoticeKind::MalformedReply,
            t!("notice.malformed_reply", detail = e.to_string()),
        ),
        GenerationError::Remote(RemoteError::Malformed(detail)) => Notice::new(
            NoticeKind::MalformedReply,
            t!("notice.malformed_reply", detail = detail),
        ),
        GenerationError::Remote(e @ RemoteError::Http { status, .. })
            if credential && e.is_auth() =>
        {
            Notice::new(
                NoticeKind::CredentialRejected,
                t!("notice.credential_rejected", status = status),
            )
        }
        GenerationError::Remote(e) if credential => Notice::new(
            NoticeKind::NetworkFailure,
            t!("notice.network_failure", detail = e.to_string()),
        ),
        GenerationError::Remote(e) => Notice::new(
            NoticeKind::ProxyFailure,
            t!("notice.proxy_failure", detail = e.to_string()),
        ),
    }
}
