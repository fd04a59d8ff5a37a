//! Document-chat window — egui/eframe application.
//!
//! # Architecture
//!
//! [`DocChatApp`] is the top-level [`eframe::App`].  It owns no chat data
//! itself: every frame it renders [`ChatState`](crate::chat::ChatState) and
//! each form's [`FormState`](crate::ingest::FormState), collects the user's
//! clicks as [`Action`]s, then releases the locks and dispatches them.
//! Network work is spawned onto the tokio runtime; the UI never awaits.
//!
//! # Layout
//!
//! | Tab | Content |
//! |-----|---------|
//! | `Conversation` | message list, language selectors, input box, new-chat and voice buttons |
//! | `Chat History` | backend log (refreshed on entry), clear button |
//! | `Document Upload` | PDF, slide deck, URL and video forms |

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::chat::{ChatState, ConversationController, LanguageOption, Message, Tab};
use crate::config::{AppConfig, VoiceConfig};
use crate::ingest::IngestionForm;
use crate::status::StatusSlot;
use crate::voice::{AudioPlayer, VoiceHandle, VoiceLoop};

const USER_BUBBLE: egui::Color32 = egui::Color32::from_rgb(40, 90, 160);
const ASSISTANT_BUBBLE: egui::Color32 = egui::Color32::from_rgb(55, 55, 60);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 136, 68);
const SUCCESS_COLOR: egui::Color32 = egui::Color32::from_rgb(80, 200, 120);

/// Poll interval while a request is in flight.
const BUSY_REPAINT: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A user interaction collected while state is locked, run afterwards.
#[derive(Debug, Clone, PartialEq)]
enum Action {
    SelectTab(Tab),
    Send,
    NewConversation,
    ClearHistory,
    StartVoice,
    StopVoice,
    InputLanguage(String),
    OutputLanguage(String),
    Submit(usize),
}

// ---------------------------------------------------------------------------
// DocChatApp
// ---------------------------------------------------------------------------

pub struct DocChatApp {
    chat: ConversationController,
    forms: Vec<IngestionForm>,
    player: Arc<dyn AudioPlayer>,
    voice_config: VoiceConfig,
    audio_base: String,
    voice: Option<VoiceHandle>,
    runtime: tokio::runtime::Handle,
    /// Set after dispatching so the next frame picks up the spawned task's
    /// first state change.
    repaint_soon: bool,
}

impl DocChatApp {
    pub fn new(
        chat: ConversationController,
        forms: Vec<IngestionForm>,
        player: Arc<dyn AudioPlayer>,
        config: &AppConfig,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        Self {
            chat,
            forms,
            player,
            voice_config: config.voice.clone(),
            audio_base: config.backend.base_url.clone(),
            voice: None,
            runtime,
            repaint_soon: false,
        }
    }

    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.runtime.spawn(future);
    }

    // ── Timers ───────────────────────────────────────────────────────────

    /// Expire statuses and report when the next repaint is needed.
    fn tick(&mut self, now: Instant) -> Option<Duration> {
        let mut next: Option<Duration> = None;
        let mut consider = |d: Option<Duration>| {
            if let Some(d) = d {
                next = Some(next.map_or(d, |n| n.min(d)));
            }
        };

        {
            let state = self.chat.state();
            let mut st = crate::chat::lock(&state);
            st.status.tick(now);
            consider(st.status.time_left(now));
            let busy = st.voice.listening
                || st.in_flight.asks > 0
                || st.in_flight.clearing_history
                || st.in_flight.starting_conversation
                || st.catalog.is_loading();
            if busy {
                consider(Some(BUSY_REPAINT));
            }
        }

        for form in &self.forms {
            let mut st = form.lock();
            st.status.tick(now);
            consider(st.status.time_left(now));
            if st.busy {
                consider(Some(BUSY_REPAINT));
            }
        }

        if self.voice.as_ref().is_some_and(VoiceHandle::is_finished) {
            self.voice = None;
        }

        if std::mem::take(&mut self.repaint_soon) {
            consider(Some(BUSY_REPAINT));
        }
        next
    }

    // ── Dispatch ─────────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        log::debug!("ui: {action:?}");
        self.repaint_soon = true;
        let chat = self.chat.clone();

        match action {
            Action::SelectTab(tab) => self.spawn(async move { chat.select_tab(tab).await }),
            Action::Send => self.spawn(async move {
                chat.send_draft().await;
            }),
            Action::NewConversation => {
                self.spawn(async move { chat.start_new_conversation().await })
            }
            Action::ClearHistory => self.spawn(async move { chat.clear_history().await }),
            Action::InputLanguage(name) => {
                if let Err(e) = chat.set_input_language(&name) {
                    log::warn!("ui: input language not saved: {e}");
                }
            }
            Action::OutputLanguage(name) => {
                if let Err(e) = chat.set_output_language(&name) {
                    log::warn!("ui: output language not saved: {e}");
                }
            }
            Action::StartVoice => {
                let handle = VoiceLoop::new(chat, Arc::clone(&self.player))
                    .with_config(&self.voice_config)
                    .with_audio_base(self.audio_base.clone())
                    .start_on(&self.runtime);
                if handle.is_some() {
                    self.voice = handle;
                }
            }
            Action::StopVoice => {
                if let Some(handle) = &self.voice {
                    handle.stop();
                }
            }
            Action::Submit(index) => {
                if let Some(form) = self.forms.get(index).cloned() {
                    self.spawn(async move {
                        form.submit().await;
                    });
                }
            }
        }
    }

    // ── Renderers ────────────────────────────────────────────────────────

    fn draw_tabs(st: &ChatState, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            for tab in Tab::ALL {
                if ui.selectable_label(st.tab == tab, tab.label()).clicked() && st.tab != tab {
                    actions.push(Action::SelectTab(tab));
                }
            }
        });
    }

    fn draw_conversation(st: &mut ChatState, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let list_height = (ui.available_height() - 150.0).max(120.0);
        egui::ScrollArea::vertical()
            .id_salt("conversation")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .max_height(list_height)
            .show(ui, |ui| Self::draw_messages(ui, &st.messages));

        ui.separator();
        Self::draw_language_selectors(st, ui, actions);

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            let width = ui.available_width() - 70.0;
            let response = ui.add(
                egui::TextEdit::singleline(&mut st.draft)
                    .hint_text("Type your message...")
                    .desired_width(width),
            );
            let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let send = ui.button("Send").clicked();
            if (enter || send) && !st.draft.trim().is_empty() {
                actions.push(Action::Send);
            }
        });

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(
                    !st.in_flight.starting_conversation,
                    egui::Button::new("Start New Conversation"),
                )
                .clicked()
            {
                actions.push(Action::NewConversation);
            }

            let caption = st.voice.label.as_deref().unwrap_or("Start Voice Chat");
            if ui
                .add_enabled(!st.voice.listening, egui::Button::new(caption))
                .clicked()
            {
                actions.push(Action::StartVoice);
            }
            if st.voice.listening && ui.button("Stop").clicked() {
                actions.push(Action::StopVoice);
            }
        });
    }

    fn draw_language_selectors(st: &ChatState, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let enabled = st.selectors_enabled();
        let loading = st.catalog.is_loading();

        ui.horizontal(|ui| {
            ui.label("Input Language");
            let current = st.prefs.input_language().to_string();
            if let Some(choice) =
                Self::language_combo(ui, "input_language", &current, &st.input_options(), enabled)
            {
                actions.push(Action::InputLanguage(choice));
            }

            ui.add_space(12.0);
            ui.label("Output Language");
            let current = st.prefs.output_language().to_string();
            if let Some(choice) =
                Self::language_combo(ui, "output_language", &current, &st.output_options(), enabled)
            {
                actions.push(Action::OutputLanguage(choice));
            }

            if loading {
                ui.weak("Loading...");
            }
        });
    }

    /// Returns the newly picked value, if it changed.
    fn language_combo(
        ui: &mut egui::Ui,
        id: &str,
        current: &str,
        options: &[LanguageOption],
        enabled: bool,
    ) -> Option<String> {
        let shown = options
            .iter()
            .find(|o| o.value == current)
            .map(|o| o.label.clone())
            .unwrap_or_else(|| current.to_string());

        let mut picked = current.to_string();
        ui.add_enabled_ui(enabled, |ui| {
            egui::ComboBox::from_id_salt(id)
                .selected_text(shown)
                .show_ui(ui, |ui| {
                    for option in options {
                        ui.selectable_value(&mut picked, option.value.clone(), option.label.as_str());
                    }
                });
        });
        (picked != current).then_some(picked)
    }

    fn draw_history(st: &ChatState, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let list_height = (ui.available_height() - 50.0).max(120.0);
        egui::ScrollArea::vertical()
            .id_salt("history")
            .auto_shrink([false, false])
            .max_height(list_height)
            .show(ui, |ui| Self::draw_messages(ui, &st.history));

        ui.separator();
        if ui
            .add_enabled(
                !st.in_flight.clearing_history,
                egui::Button::new("Clear History"),
            )
            .clicked()
        {
            actions.push(Action::ClearHistory);
        }
    }

    fn draw_upload(forms: &[IngestionForm], ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        for (index, form) in forms.iter().enumerate() {
            let kind = form.kind();
            let mut st = form.lock();

            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    let width = ui.available_width() - 160.0;
                    let enabled = !st.busy;
                    ui.add_enabled(
                        enabled,
                        egui::TextEdit::singleline(&mut st.input)
                            .hint_text(kind.placeholder())
                            .desired_width(width),
                    );
                    let label = if st.busy {
                        kind.busy_label()
                    } else {
                        kind.submit_label()
                    };
                    if ui
                        .add_enabled(st.can_submit(), egui::Button::new(label))
                        .clicked()
                    {
                        actions.push(Action::Submit(index));
                    }
                });
                Self::draw_status(ui, &st.status);
            });
            ui.add_space(6.0);
        }
    }

    fn draw_messages(ui: &mut egui::Ui, messages: &[Message]) {
        if messages.is_empty() {
            ui.weak("No conversation yet.");
            return;
        }

        for message in messages {
            let (layout, fill) = if message.is_user() {
                (egui::Layout::right_to_left(egui::Align::TOP), USER_BUBBLE)
            } else {
                (egui::Layout::left_to_right(egui::Align::TOP), ASSISTANT_BUBBLE)
            };

            ui.with_layout(layout, |ui| {
                egui::Frame::new()
                    .fill(fill)
                    .corner_radius(egui::CornerRadius::same(8))
                    .inner_margin(egui::Margin::same(8))
                    .show(ui, |ui| {
                        let max_width = ui.available_width() * 0.75;
                        ui.set_max_width(max_width);
                        ui.vertical(|ui| {
                            ui.label(
                                egui::RichText::new(message.text.as_str())
                                    .color(egui::Color32::from_rgb(230, 230, 230)),
                            );
                            if let Some(sources) = message.sources.as_ref().filter(|s| !s.is_empty())
                            {
                                ui.small(format!("Sources: {}", sources.join(", ")));
                            }
                        });
                    });
            });
            ui.add_space(4.0);
        }
    }

    /// Tabs, the conversation status (visible on every tab), then the
    /// selected tab's content.
    fn draw_central(&self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        let state = self.chat.state();
        egui::CentralPanel::default().show(ctx, |ui| {
            let mut st = crate::chat::lock(&state);

            Self::draw_tabs(&st, ui, actions);
            Self::draw_status(ui, &st.status);
            ui.separator();

            match st.tab {
                Tab::Conversation => Self::draw_conversation(&mut st, ui, actions),
                Tab::History => Self::draw_history(&st, ui, actions),
                Tab::Upload => Self::draw_upload(&self.forms, ui, actions),
            }
        });
    }

    fn draw_status(ui: &mut egui::Ui, status: &StatusSlot) {
        if let Some(text) = status.error() {
            ui.colored_label(ERROR_COLOR, text);
        }
        if let Some(text) = status.success() {
            ui.colored_label(SUCCESS_COLOR, text);
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for DocChatApp {
    /// Called every frame by eframe.  Expires statuses, renders, then runs
    /// whatever the user clicked.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(after) = self.tick(Instant::now()) {
            ctx.request_repaint_after(after);
        }

        let mut actions = Vec::new();
        self.draw_central(ctx, &mut actions);

        for action in actions {
            self.dispatch(action);
        }
        if self.repaint_soon {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(handle) = &self.voice {
            handle.stop();
        }
        log::info!("document chat window closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockBackend;
    use crate::api::Backend;
    use crate::config::{PreferenceStore, StatusConfig};
    use crate::voice::NullPlayer;

    fn app(runtime: &tokio::runtime::Runtime) -> DocChatApp {
        let backend: Arc<dyn Backend> = Arc::new(MockBackend::new());
        let config = AppConfig::default();
        let chat = ConversationController::new(
            Arc::clone(&backend),
            PreferenceStore::in_memory(),
            StatusConfig::default(),
        );
        let forms = IngestionForm::all(&backend, &config.status);
        DocChatApp::new(chat, forms, Arc::new(NullPlayer), &config, runtime.handle().clone())
    }

    #[test]
    fn tick_expires_statuses_and_schedules_repaint() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&runtime);
        let now = Instant::now();

        {
            let state = app.chat.state();
            let mut st = crate::chat::lock(&state);
            st.catalog = crate::chat::CatalogState::Failed;
            st.status.set_error_at("boom", Duration::from_secs(3), now);
        }
        app.forms[0]
            .lock()
            .status
            .set_success_at("ok", Duration::from_secs(2), now);

        assert_eq!(app.tick(now), Some(Duration::from_secs(2)));

        assert_eq!(app.tick(now + Duration::from_secs(5)), None);
        assert!(crate::chat::lock(&app.chat.state()).status.current().is_none());
        assert!(app.forms[0].lock().status.current().is_none());
    }

    #[test]
    fn busy_form_keeps_polling() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&runtime);
        crate::chat::lock(&app.chat.state()).catalog = crate::chat::CatalogState::Failed;
        app.forms[2].lock().busy = true;

        assert_eq!(app.tick(Instant::now()), Some(BUSY_REPAINT));
    }

    fn rendered_text(app: &DocChatApp) -> Vec<String> {
        fn collect(shape: &egui::Shape, out: &mut Vec<String>) {
            match shape {
                egui::Shape::Text(text) => out.push(text.galley.text().to_string()),
                egui::Shape::Vec(shapes) => shapes.iter().for_each(|s| collect(s, out)),
                _ => {}
            }
        }

        let ctx = egui::Context::default();
        let mut actions = Vec::new();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            app.draw_central(ctx, &mut actions);
        });
        let mut texts = Vec::new();
        for clipped in &output.shapes {
            collect(&clipped.shape, &mut texts);
        }
        texts
    }

    #[test]
    fn conversation_status_is_shown_on_every_tab() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let app = app(&runtime);
        crate::chat::lock(&app.chat.state())
            .status
            .set_error(crate::chat::controller::CATALOG_ERROR, Duration::from_secs(2));

        for tab in Tab::ALL {
            crate::chat::lock(&app.chat.state()).tab = tab;
            let texts = rendered_text(&app);
            assert!(
                texts.iter().any(|t| t == crate::chat::controller::CATALOG_ERROR),
                "status missing on {tab:?}: {texts:?}"
            );
        }
    }

    #[test]
    fn language_actions_update_preferences() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&runtime);

        app.dispatch(Action::InputLanguage("French".into()));
        app.dispatch(Action::OutputLanguage("auto-detect".into()));
        app.dispatch(Action::OutputLanguage("Spanish".into()));

        let prefs = app.chat.preferences();
        assert_eq!(prefs.input_language(), "French");
        assert_eq!(prefs.output_language(), "Spanish");
    }
}
