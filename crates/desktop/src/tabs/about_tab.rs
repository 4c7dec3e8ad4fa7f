use iced::widget::{column, text, Space};
use iced::Element;

use crate::app::{scaled, Message};

pub fn view(fs: f32) -> Element<'static, Message> {
    let version = env!("CARGO_PKG_VERSION");

    column![
        text("Dictation").size(scaled(22.0, fs)),
        Space::new().height(4),
        text(format!("Version {version}")).size(scaled(13.0, fs)),
        Space::new().height(12),
        text(
            "Listen to a recording one sentence at a time and type what you hear. \
             Each sentence loops until every word is right, then its translation \
             and word glosses are shown."
        )
        .size(scaled(13.0, fs)),
        Space::new().height(16),
        text("How it works").size(scaled(16.0, fs)),
        Space::new().height(6),
        text(
            "Uploaded audio is sent to the lesson service, which returns timed \
             sentences. A prepared .json lesson can be opened without the service."
        )
        .size(scaled(13.0, fs)),
        Space::new().height(12),
        text("Enter confirms a word, or moves on once the sentence is complete.")
            .size(scaled(13.0, fs)),
    ]
    .spacing(0)
    .into()
}
