pub mod dictation_session;
pub mod load_lesson_use_case;
pub mod session_config;
pub mod session_logger;
