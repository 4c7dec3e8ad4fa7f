pub mod about_tab;
pub mod practice_tab;
pub mod settings_tab;
