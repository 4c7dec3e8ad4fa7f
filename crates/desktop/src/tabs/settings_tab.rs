use iced::widget::{
    button, checkbox, column, container, pick_list, row, slider, text, text_input, Space,
};
use iced::{Element, Length, Theme};

use dictation_core::dictation::domain::dictation_matcher::{MatchGranularity, RevertPolicy};
use dictation_core::dictation::domain::language_profile::LanguageProfile;
use dictation_core::dictation::domain::mismatch::Mismatch;
use dictation_core::shared::constants::{MAX_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS};

use crate::app::{scaled, Message};
use crate::settings::{Appearance, Settings};
use crate::theme::FeedbackColors;

pub fn view<'a>(settings: &Settings, theme: &Theme) -> Element<'a, Message> {
    let fs = settings.font_scale;
    let session = &settings.session;

    let labeled = |label: &'a str, control: Element<'a, Message>| -> Element<'a, Message> {
        row![text(label).size(scaled(13.0, fs)).width(140), control]
            .spacing(12)
            .align_y(iced::Alignment::Center)
            .into()
    };

    column![
        text("Lesson service").size(scaled(16.0, fs)),
        Space::new().height(8),
        labeled(
            "Service URL",
            text_input("http://localhost:5000", &settings.service_url)
                .on_input(Message::ServiceUrlChanged)
                .size(scaled(13.0, fs))
                .into(),
        ),
        Space::new().height(8),
        labeled(
            "Language",
            pick_list(LanguageProfile::ALL, Some(session.profile), Message::ProfileChanged)
                .text_size(scaled(13.0, fs))
                .into(),
        ),
        Space::new().height(20),
        text("Typing").size(scaled(16.0, fs)),
        Space::new().height(8),
        labeled(
            "Check input",
            pick_list(
                MatchGranularity::ALL,
                Some(session.granularity),
                Message::GranularityChanged,
            )
            .text_size(scaled(13.0, fs))
            .into(),
        ),
        Space::new().height(8),
        labeled(
            "Wrong letter",
            pick_list(
                RevertPolicy::ALL,
                Some(session.revert_policy),
                Message::RevertPolicyChanged,
            )
            .text_size(scaled(13.0, fs))
            .into(),
        ),
        Space::new().height(20),
        text("Playback").size(scaled(16.0, fs)),
        Space::new().height(8),
        checkbox(session.loop_default)
            .label("Loop each sentence until it is typed")
            .on_toggle(Message::LoopDefaultChanged)
            .text_size(scaled(13.0, fs)),
        Space::new().height(8),
        labeled(
            "Boundary check",
            row![
                slider(
                    MIN_POLL_INTERVAL_MS as u32..=MAX_POLL_INTERVAL_MS as u32,
                    session.poll_interval_ms as u32,
                    Message::PollIntervalChanged,
                )
                .step(10u32),
                text(format!("{} ms", session.poll_interval_ms)).size(scaled(13.0, fs)),
            ]
            .spacing(12)
            .align_y(iced::Alignment::Center)
            .into(),
        ),
        Space::new().height(12),
        text("Changes apply to the next lesson you load.")
            .size(scaled(12.0, fs)),
        Space::new().height(16),
        button(text("Restore Defaults").size(scaled(13.0, fs)))
            .on_press(Message::RestoreDefaults)
            .padding([8, 16])
            .style(button::secondary),
        Space::new().height(28),
        text("Display").size(scaled(16.0, fs)),
        Space::new().height(8),
        labeled(
            "Theme",
            pick_list(Appearance::ALL, Some(settings.appearance), Message::AppearanceChanged)
                .text_size(scaled(13.0, fs))
                .into(),
        ),
        Space::new().height(8),
        checkbox(settings.high_contrast)
            .label("High contrast")
            .on_toggle(Message::HighContrastChanged)
            .text_size(scaled(13.0, fs)),
        Space::new().height(8),
        labeled(
            "Text size",
            row![
                slider(0.8..=1.6, settings.font_scale, Message::FontScaleChanged).step(0.05),
                text(format!("{:.0}%", settings.font_scale * 100.0)).size(scaled(13.0, fs)),
            ]
            .spacing(12)
            .align_y(iced::Alignment::Center)
            .into(),
        ),
        Space::new().height(12),
        feedback_preview(fs, FeedbackColors::from_theme(theme)),
    ]
    .spacing(0)
    .into()
}

/// How typing feedback looks with the current display settings.
fn feedback_preview<'a>(fs: f32, colors: FeedbackColors) -> Element<'a, Message> {
    let wrong = Mismatch::WrongLetter { typed: "rx".into() };
    container(
        column![
            text("she is in the living").size(scaled(18.0, fs)),
            text(wrong.to_string()).size(scaled(13.0, fs)).color(colors.wrong),
            text("Next word: room").size(scaled(13.0, fs)).color(colors.muted),
            text("Correct!").size(scaled(15.0, fs)).color(colors.correct),
        ]
        .spacing(4),
    )
    .padding([14, 16])
    .style(container::rounded_box)
    .width(Length::Fill)
    .into()
}
