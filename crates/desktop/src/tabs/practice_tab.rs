use iced::widget::{button, checkbox, column, container, progress_bar, row, text, text_input, Space};
use iced::{Element, Length, Theme};

use dictation_core::session::dictation_session::DictationSession;
use dictation_core::shared::constants::AUDIO_EXTENSIONS;

use crate::app::{scaled, LoadState, Message};
use crate::theme::FeedbackColors;

pub fn view<'a>(
    fs: f32,
    session: Option<&'a DictationSession>,
    answer: &'a str,
    hint: Option<&'a str>,
    load_state: &'a LoadState,
    theme: &Theme,
) -> Element<'a, Message> {
    let colors = FeedbackColors::from_theme(theme);

    match session {
        None => match load_state {
            LoadState::Loading { status, download } => loading_state(fs, colors, status, *download),
            LoadState::Failed(e) => empty_state(fs, colors, Some(e.as_str())),
            LoadState::Idle => empty_state(fs, colors, None),
        },
        Some(s) if s.is_finished() => complete_state(fs, colors, s),
        Some(s) => practice_view(fs, colors, s, answer, hint, load_state),
    }
}

fn empty_state<'a>(fs: f32, colors: FeedbackColors, error: Option<&str>) -> Element<'a, Message> {
    let mut col = column![
        text("Practice dictation").size(scaled(20.0, fs)),
        Space::new().height(6),
        text("Upload a recording. It is split into sentences you type as you listen.")
            .size(scaled(14.0, fs))
            .color(colors.muted),
        Space::new().height(24),
        button(text("Choose Audio\u{2026}").size(scaled(15.0, fs)))
            .on_press(Message::SelectAudio)
            .padding([14, 24])
            .width(Length::Fill),
        Space::new().height(12),
        text(format!(
            "{} or a .json lesson",
            AUDIO_EXTENSIONS.join(", ").to_uppercase()
        ))
        .size(scaled(12.0, fs))
        .color(colors.muted),
    ]
    .align_x(iced::Alignment::Center)
    .width(360);

    if let Some(e) = error {
        col = col
            .push(Space::new().height(20))
            .push(text("Upload failed").size(scaled(15.0, fs)).color(colors.wrong))
            .push(text(e.to_owned()).size(scaled(13.0, fs)).color(colors.muted));
    }

    centered(col.into())
}

fn loading_state<'a>(
    fs: f32,
    colors: FeedbackColors,
    status: &str,
    download: Option<(u64, u64)>,
) -> Element<'a, Message> {
    let mut col = column![text(status.to_owned()).size(scaled(15.0, fs))]
        .spacing(8)
        .align_x(iced::Alignment::Center)
        .width(Length::Fill);

    if let Some((received, total)) = download {
        if total > 0 {
            col = col.push(progress_bar(
                0.0..=100.0,
                received as f32 / total as f32 * 100.0,
            ));
        } else {
            col = col.push(
                text(format!("{received} bytes"))
                    .size(scaled(13.0, fs))
                    .color(colors.muted),
            );
        }
    }

    container(col)
        .width(Length::Fill)
        .center_x(Length::Fill)
        .padding([48, 40])
        .into()
}

fn complete_state<'a>(fs: f32, colors: FeedbackColors, session: &'a DictationSession) -> Element<'a, Message> {
    let (_, total) = session.progress();
    centered(
        column![
            text("Lesson complete!").size(scaled(20.0, fs)).color(colors.correct),
            Space::new().height(6),
            text(format!(
                "You typed all {total} sentences of \"{}\".",
                session.lesson().title()
            ))
            .size(scaled(14.0, fs))
            .color(colors.muted),
            Space::new().height(28),
            button(text("Load Another Lesson").size(scaled(15.0, fs)))
                .on_press(Message::StartOver)
                .padding([14, 24])
                .width(Length::Fill),
            Space::new().height(10),
            button(text("Back to Last Sentence").size(scaled(14.0, fs)))
                .on_press(Message::PreviousSegment)
                .padding([14, 20])
                .width(Length::Fill)
                .style(button::secondary),
        ]
        .align_x(iced::Alignment::Center)
        .width(280)
        .into(),
    )
}

fn practice_view<'a>(
    fs: f32,
    colors: FeedbackColors,
    session: &'a DictationSession,
    answer: &'a str,
    hint: Option<&'a str>,
    load_state: &'a LoadState,
) -> Element<'a, Message> {
    let (current, total) = session.progress();
    let completed = session.is_segment_completed();

    let mut col = column![].spacing(0);

    match load_state {
        LoadState::Loading { status, .. } => {
            col = col
                .push(text(status.to_owned()).size(scaled(13.0, fs)).color(colors.muted))
                .push(Space::new().height(8));
        }
        LoadState::Failed(e) => {
            col = col
                .push(text(format!("Upload failed: {e}")).size(scaled(13.0, fs)).color(colors.wrong))
                .push(Space::new().height(8));
        }
        LoadState::Idle => {}
    }

    let header = row![
        column![
            text(session.lesson().title().to_owned()).size(scaled(17.0, fs)),
            text(format!("Sentence {current} of {total}"))
                .size(scaled(12.0, fs))
                .color(colors.muted),
        ]
        .width(Length::Fill),
        button(text("Change").size(scaled(13.0, fs)))
            .padding([6, 14])
            .on_press(Message::SelectAudio)
            .style(button::secondary),
    ]
    .align_y(iced::Alignment::Center);

    let controls = row![
        button(text("\u{25B6} Play Sentence").size(scaled(14.0, fs)))
            .on_press(Message::PlaySegment)
            .padding([8, 16]),
        button(text("Pause").size(scaled(14.0, fs)))
            .on_press(Message::PauseSegment)
            .padding([8, 16])
            .style(button::secondary),
        checkbox(session.loop_enabled())
            .label("Loop sentence")
            .on_toggle(Message::LoopToggled)
            .text_size(scaled(13.0, fs)),
    ]
    .spacing(10)
    .align_y(iced::Alignment::Center);

    let confirmed = if session.confirmed_tokens().is_empty() {
        text("\u{2026}").size(scaled(18.0, fs)).color(colors.muted)
    } else {
        text(session.confirmed_tokens().join(" ")).size(scaled(18.0, fs))
    };
    let typed = container(confirmed)
        .padding([14, 16])
        .style(container::rounded_box)
        .width(Length::Fill);

    let mut input = text_input("Type what you hear\u{2026}", answer)
        .size(scaled(16.0, fs))
        .padding(10)
        .on_submit(Message::AnswerSubmitted);
    if !completed {
        input = input.on_input(Message::AnswerChanged);
    }

    col = col
        .push(header)
        .push(Space::new().height(16))
        .push(controls)
        .push(Space::new().height(16))
        .push(typed)
        .push(Space::new().height(10))
        .push(input);

    if let Some(error) = session.last_error() {
        col = col
            .push(Space::new().height(6))
            .push(text(error.to_string()).size(scaled(13.0, fs)).color(colors.wrong));
    }
    if let Some(hint) = hint {
        col = col
            .push(Space::new().height(6))
            .push(text(hint.to_owned()).size(scaled(13.0, fs)).color(colors.muted));
    }

    if let Some(reveal) = session.completion_reveal() {
        let mut reveal_col = column![
            text("Correct!").size(scaled(15.0, fs)).color(colors.correct),
            text(reveal.transcript.to_owned()).size(scaled(15.0, fs)),
        ]
        .spacing(4);
        if let Some(translation) = reveal.translation {
            reveal_col = reveal_col.push(
                text(translation.to_owned())
                    .size(scaled(14.0, fs))
                    .color(colors.muted),
            );
        }
        for a in reveal.annotations {
            reveal_col = reveal_col.push(
                row![
                    text(a.word.clone()).size(scaled(14.0, fs)).width(90),
                    text(a.phonetic.clone().unwrap_or_default())
                        .size(scaled(13.0, fs))
                        .width(110),
                    text(a.meaning.clone().unwrap_or_default())
                        .size(scaled(13.0, fs))
                        .color(colors.muted),
                ]
                .spacing(8),
            );
        }
        col = col.push(Space::new().height(16)).push(
            container(reveal_col)
                .padding([12, 16])
                .style(container::rounded_box)
                .width(Length::Fill),
        );
    } else if session.transcript_visible() {
        let segment = session.current_segment();
        let mut transcript = column![text(segment.transcript.clone()).size(scaled(14.0, fs))].spacing(4);
        if let Some(translation) = &segment.translation {
            transcript = transcript.push(
                text(translation.clone())
                    .size(scaled(13.0, fs))
                    .color(colors.muted),
            );
        }
        col = col.push(Space::new().height(12)).push(transcript);
    }

    let transcript_label = if session.transcript_visible() {
        "Hide Transcript"
    } else {
        "Show Transcript"
    };
    let helpers = row![
        button(text(transcript_label).size(scaled(13.0, fs)))
            .on_press(Message::ToggleTranscript)
            .style(button::text),
        button(text("Hint").size(scaled(13.0, fs)))
            .on_press_maybe((!completed).then_some(Message::ShowHint))
            .style(button::text),
    ]
    .spacing(4);

    let navigation = row![
        button(text("\u{2190} Previous").size(scaled(14.0, fs)))
            .on_press_maybe(session.can_go_previous().then_some(Message::PreviousSegment))
            .padding([10, 20])
            .style(button::secondary),
        Space::new().width(Length::Fill),
        button(text("Next \u{2192}").size(scaled(14.0, fs)))
            .on_press_maybe(session.can_go_next().then_some(Message::NextSegment))
            .padding([10, 20]),
    ]
    .align_y(iced::Alignment::Center);

    col.push(Space::new().height(12))
        .push(helpers)
        .push(Space::new().height(20))
        .push(navigation)
        .into()
}

fn centered(content: Element<'_, Message>) -> Element<'_, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
