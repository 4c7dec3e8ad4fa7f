use std::path::PathBuf;
use std::time::Duration;

use crossbeam_channel::Receiver;
use iced::widget::{button, column, container, row, scrollable, text};
use iced::{Element, Length, Subscription, Task, Theme};

use dictation_core::dictation::domain::dictation_matcher::{
    MatchGranularity, MatchOutcome, RevertPolicy,
};
use dictation_core::dictation::domain::language_profile::LanguageProfile;
use dictation_core::lesson::domain::lesson::Lesson;
use dictation_core::playback::domain::media_player::MediaPlayer;
use dictation_core::playback::infrastructure::rodio_media_player::RodioMediaPlayer;
use dictation_core::playback::infrastructure::simulated_media_player::{
    SimulatedMediaPlayer, SystemClock,
};
use dictation_core::session::dictation_session::{Advance, DictationSession};
use dictation_core::session::session_logger::NullSessionLogger;
use dictation_core::shared::constants::{AUDIO_EXTENSIONS, LESSON_FILE_EXTENSION};

use crate::settings::{Appearance, Settings};
use crate::tabs;
use crate::theme;
use crate::workers::upload_worker::{self, UploadMessage, UploadParams};

// ---------------------------------------------------------------------------
// Tab enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Practice,
    Settings,
    About,
}

impl Tab {
    const ALL: &[Tab] = &[Tab::Practice, Tab::Settings, Tab::About];

    fn label(self) -> &'static str {
        match self {
            Tab::Practice => "Practice",
            Tab::Settings => "Settings",
            Tab::About => "About",
        }
    }
}

// ---------------------------------------------------------------------------
// Load state
// ---------------------------------------------------------------------------

/// Progress of the most recent upload. `Loading` gates new uploads.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading {
        status: String,
        download: Option<(u64, u64)>,
    },
    Failed(String),
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    SelectAudio,
    AudioSelected(Option<PathBuf>),
    PollWorker,
    PlaybackTick,
    AnswerChanged(String),
    AnswerSubmitted,
    PlaySegment,
    PauseSegment,
    LoopToggled(bool),
    NextSegment,
    PreviousSegment,
    ToggleTranscript,
    ShowHint,
    StartOver,
    ServiceUrlChanged(String),
    ProfileChanged(LanguageProfile),
    GranularityChanged(MatchGranularity),
    RevertPolicyChanged(RevertPolicy),
    LoopDefaultChanged(bool),
    PollIntervalChanged(u32),
    RestoreDefaults,
    AppearanceChanged(Appearance),
    HighContrastChanged(bool),
    FontScaleChanged(f32),
    PollSystemTheme,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    active_tab: Tab,
    pub settings: Settings,
    session: Option<DictationSession>,
    load_state: LoadState,
    upload_rx: Option<Receiver<UploadMessage>>,
    answer: String,
    hint: Option<String>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        (
            Self {
                active_tab: Tab::Practice,
                settings: Settings::load(),
                session: None,
                load_state: LoadState::Idle,
                upload_rx: None,
                answer: String::new(),
                hint: None,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.active_tab = tab;
            }
            Message::SelectAudio => {
                if !self.can_start_upload() {
                    return Task::none();
                }
                let mut extensions: Vec<&str> = AUDIO_EXTENSIONS.to_vec();
                extensions.push(LESSON_FILE_EXTENSION);
                return Task::perform(
                    async move {
                        rfd::AsyncFileDialog::new()
                            .set_title("Select lesson audio")
                            .add_filter("Audio or lesson", &extensions)
                            .pick_file()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::AudioSelected,
                );
            }
            Message::AudioSelected(Some(path)) => {
                if !self.can_start_upload() {
                    log::debug!("Ignoring {}: a lesson is already loading", path.display());
                    return Task::none();
                }
                log::info!("Loading lesson from {}", path.display());
                self.load_state = LoadState::Loading {
                    status: "Preparing\u{2026}".into(),
                    download: None,
                };
                self.upload_rx = Some(upload_worker::spawn(UploadParams {
                    input_path: path,
                    service: self.settings.service_config(),
                }));
                self.active_tab = Tab::Practice;
            }
            Message::AudioSelected(None) => {}
            Message::PollWorker => self.poll_worker(),
            Message::PlaybackTick => {
                if let Some(session) = self.session.as_mut() {
                    session.tick();
                }
            }
            Message::AnswerChanged(value) => {
                if let Some(session) = self.session.as_mut() {
                    let outcome = session.input(&value);
                    let whole_word = session.config().granularity == MatchGranularity::WholeWord;
                    if whole_word && outcome == MatchOutcome::Partial && value.ends_with(' ') {
                        session.submit();
                    }
                    self.answer = session.pending_input().to_string();
                    self.hint = None;
                }
            }
            Message::AnswerSubmitted => {
                let completed = self
                    .session
                    .as_ref()
                    .is_some_and(|s| s.is_segment_completed());
                if completed {
                    return self.update(Message::NextSegment);
                }
                if let Some(session) = self.session.as_mut() {
                    session.submit();
                    self.answer = session.pending_input().to_string();
                }
            }
            Message::PlaySegment => {
                if let Some(session) = self.session.as_mut() {
                    session.play_current();
                }
            }
            Message::PauseSegment => {
                if let Some(session) = self.session.as_mut() {
                    session.pause();
                }
            }
            Message::LoopToggled(enabled) => {
                if let Some(session) = self.session.as_mut() {
                    session.set_loop_enabled(enabled);
                }
            }
            Message::NextSegment => {
                if let Some(session) = self.session.as_mut() {
                    match session.next() {
                        Ok(Advance::Moved(index)) => log::debug!("Moved to sentence {}", index + 1),
                        Ok(Advance::LessonCompleted) => log::info!("Lesson complete"),
                        Err(e) => log::debug!("Next ignored: {e}"),
                    }
                    self.answer.clear();
                    self.hint = None;
                }
            }
            Message::PreviousSegment => {
                if let Some(session) = self.session.as_mut() {
                    if let Err(e) = session.previous() {
                        log::debug!("Previous ignored: {e}");
                    }
                    self.answer.clear();
                    self.hint = None;
                }
            }
            Message::ToggleTranscript => {
                if let Some(session) = self.session.as_mut() {
                    session.toggle_transcript();
                }
            }
            Message::ShowHint => {
                self.hint = self.session.as_ref().and_then(|s| s.hint()).map(|hint| {
                    let gloss: Vec<String> = hint
                        .annotation
                        .map(|a| [a.phonetic, a.meaning].into_iter().flatten().collect())
                        .unwrap_or_default();
                    if gloss.is_empty() {
                        format!("Next word: {}", hint.token)
                    } else {
                        format!("Next word: {} ({})", hint.token, gloss.join(", "))
                    }
                });
            }
            Message::StartOver => {
                self.session = None;
                self.answer.clear();
                self.hint = None;
                if !matches!(self.load_state, LoadState::Loading { .. }) {
                    self.load_state = LoadState::Idle;
                }
            }
            Message::ServiceUrlChanged(url) => {
                self.settings.service_url = url;
                self.settings.save();
            }
            Message::ProfileChanged(profile) => {
                self.settings.session.profile = profile;
                self.settings.save();
            }
            Message::GranularityChanged(granularity) => {
                self.settings.session.granularity = granularity;
                self.settings.save();
            }
            Message::RevertPolicyChanged(policy) => {
                self.settings.session.revert_policy = policy;
                self.settings.save();
            }
            Message::LoopDefaultChanged(enabled) => {
                self.settings.session.loop_default = enabled;
                self.settings.save();
            }
            Message::PollIntervalChanged(ms) => {
                self.settings.session.poll_interval_ms = ms as u64;
                self.settings.save();
            }
            Message::RestoreDefaults => {
                let defaults = Settings::default();
                self.settings.session = defaults.session;
                self.settings.service_url = defaults.service_url;
                self.settings.timeout_secs = defaults.timeout_secs;
                self.settings.save();
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::HighContrastChanged(enabled) => {
                self.settings.high_contrast = enabled;
                self.settings.save();
            }
            Message::FontScaleChanged(scale) => {
                self.settings.font_scale = scale;
                self.settings.save();
            }
            Message::PollSystemTheme => {
                // Theme is resolved fresh in theme() on every render,
                // so just requesting a redraw is enough.
            }
        }
        Task::none()
    }

    fn can_start_upload(&self) -> bool {
        !matches!(self.load_state, LoadState::Loading { .. })
    }

    fn poll_worker(&mut self) {
        let Some(rx) = self.upload_rx.clone() else {
            return;
        };
        for message in rx.try_iter() {
            match message {
                UploadMessage::Status(status) => {
                    self.load_state = LoadState::Loading {
                        status,
                        download: None,
                    };
                }
                UploadMessage::DownloadProgress(received, total) => {
                    if let LoadState::Loading { download, .. } = &mut self.load_state {
                        *download = Some((received, total));
                    }
                }
                UploadMessage::Loaded { lesson, audio } => {
                    self.start_session(lesson, audio);
                    self.load_state = LoadState::Idle;
                    self.upload_rx = None;
                }
                UploadMessage::Error(e) => {
                    self.load_state = LoadState::Failed(e);
                    self.upload_rx = None;
                }
            }
        }
    }

    /// Replace the current session; the old one pauses when dropped.
    fn start_session(&mut self, lesson: Lesson, audio: Option<Vec<u8>>) {
        let lesson_end = lesson.segments().last().map(|s| s.end).unwrap_or(0.0);
        let player: Box<dyn MediaPlayer> = match audio.map(RodioMediaPlayer::from_bytes) {
            Some(Ok(player)) => Box::new(player),
            Some(Err(e)) => {
                log::warn!("{e}; practicing without sound");
                Box::new(SimulatedMediaPlayer::new(lesson_end, SystemClock::new()))
            }
            None => Box::new(SimulatedMediaPlayer::new(lesson_end, SystemClock::new())),
        };

        self.session = None;
        self.session = Some(DictationSession::new(
            lesson,
            player,
            self.settings.session.clone(),
            Box::new(NullSessionLogger),
        ));
        self.answer.clear();
        self.hint = None;
    }

    pub fn view(&self) -> Element<'_, Message> {
        let fs = self.settings.font_scale;
        let theme = self.theme();

        // Tab bar
        let tab_bar = row(Tab::ALL
            .iter()
            .map(|&tab| {
                let label = text(tab.label()).size(scaled(13.0, fs));
                let btn = button(label)
                    .on_press(Message::TabSelected(tab))
                    .padding([6, 14]);
                if tab == self.active_tab {
                    btn.style(button::primary).into()
                } else {
                    btn.style(button::text).into()
                }
            })
            .collect::<Vec<_>>())
        .spacing(2);

        // Tab content
        let content: Element<'_, Message> = match self.active_tab {
            Tab::Practice => tabs::practice_tab::view(
                fs,
                self.session.as_ref(),
                &self.answer,
                self.hint.as_deref(),
                &self.load_state,
                &theme,
            ),
            Tab::Settings => tabs::settings_tab::view(&self.settings, &theme),
            Tab::About => tabs::about_tab::view(fs),
        };

        let tab_content = container(scrollable(content).height(Length::Fill))
            .padding(16)
            .height(Length::Fill);

        column![tab_bar, tab_content]
            .spacing(0)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance, self.settings.high_contrast)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = Vec::new();

        if self.upload_rx.is_some() {
            subscriptions
                .push(iced::time::every(Duration::from_millis(100)).map(|_| Message::PollWorker));
        }
        if let Some(session) = self.session.as_ref().filter(|s| s.is_polling()) {
            subscriptions.push(
                iced::time::every(session.poll_interval()).map(|_| Message::PlaybackTick),
            );
        }
        if self.settings.appearance == Appearance::System {
            subscriptions
                .push(iced::time::every(Duration::from_secs(2)).map(|_| Message::PollSystemTheme));
        }

        Subscription::batch(subscriptions)
    }
}

/// Scale a base font size by the user's font_scale setting.
pub fn scaled(base: f32, font_scale: f32) -> f32 {
    (base * font_scale).round()
}
