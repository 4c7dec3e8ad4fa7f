mod app;
mod settings;
mod tabs;
mod theme;
mod workers;

use app::App;

fn main() -> iced::Result {
    env_logger::init();

    iced::application(App::new, App::update, App::view)
        .title("Dictation")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(iced::window::Settings {
            size: iced::Size::new(640.0, 600.0),
            min_size: Some(iced::Size::new(480.0, 420.0)),
            ..Default::default()
        })
        .run()
}
