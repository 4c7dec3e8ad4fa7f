use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;

use clap::Parser;
use crossbeam_channel::{select, Receiver};

use dictation_core::dictation::domain::dictation_matcher::{
    MatchGranularity, MatchOutcome, RevertPolicy,
};
use dictation_core::dictation::domain::language_profile::LanguageProfile;
use dictation_core::lesson::domain::lesson::Lesson;
use dictation_core::lesson::infrastructure::http_segmentation_client::{
    HttpSegmentationClient, ServiceConfig,
};
use dictation_core::lesson::infrastructure::lesson_file::read_lesson_file;
use dictation_core::playback::domain::media_player::MediaPlayer;
use dictation_core::playback::infrastructure::audio_fetcher::fetch_audio;
use dictation_core::playback::infrastructure::rodio_media_player::RodioMediaPlayer;
use dictation_core::playback::infrastructure::simulated_media_player::{
    SimulatedMediaPlayer, SystemClock,
};
use dictation_core::session::dictation_session::{Advance, DictationSession};
use dictation_core::session::load_lesson_use_case::LoadLessonUseCase;
use dictation_core::session::session_config::SessionConfig;
use dictation_core::session::session_logger::StdoutSessionLogger;
use dictation_core::shared::constants::{
    AUDIO_EXTENSIONS, DEFAULT_SERVICE_TIMEOUT_SECS, DEFAULT_SERVICE_URL, LESSON_FILE_EXTENSION,
    MAX_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS,
};

/// Listen to a lesson sentence by sentence and type what you hear.
#[derive(Parser)]
#[command(name = "dictation")]
struct Cli {
    /// Audio file to segment, or a prepared lesson (.json).
    input: PathBuf,

    /// Base URL of the segmentation service.
    #[arg(long, default_value = DEFAULT_SERVICE_URL)]
    service_url: String,

    /// Upload endpoint path (defaults to the profile's endpoint).
    #[arg(long)]
    upload_path: Option<String>,

    /// Seconds to wait for the segmentation service.
    #[arg(long, default_value_t = DEFAULT_SERVICE_TIMEOUT_SECS)]
    timeout: u64,

    /// Lesson language: english or chinese.
    #[arg(long, default_value = "english")]
    profile: String,

    /// Matching: prefix (checked per letter) or word (checked per word).
    #[arg(long, default_value = "prefix")]
    granularity: String,

    /// On a wrong letter: drop (remove it) or flag (keep it, show error).
    #[arg(long, default_value = "drop")]
    revert: String,

    /// Start with sentence looping off.
    #[arg(long)]
    no_loop: bool,

    /// Boundary check interval in milliseconds (10-100).
    #[arg(long, default_value = "100")]
    poll_interval_ms: u64,

    /// Don't open an audio device; simulate playback time instead.
    #[arg(long)]
    silent: bool,
}

enum Flow {
    Continue,
    Quit,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = SessionConfig {
        profile: parse_profile(&cli.profile),
        granularity: parse_granularity(&cli.granularity),
        revert_policy: parse_revert(&cli.revert),
        loop_default: !cli.no_loop,
        poll_interval_ms: cli.poll_interval_ms,
    };

    let lesson = load_lesson(&cli, config.profile)?;
    let player = build_player(&lesson, cli.silent);
    let mut session = DictationSession::new(
        lesson,
        player,
        config,
        Box::new(StdoutSessionLogger::new()),
    );

    print_help();
    print_segment_header(&session);
    practice(&mut session)?;
    session.summary();
    Ok(())
}

fn load_lesson(cli: &Cli, profile: LanguageProfile) -> Result<Lesson, Box<dyn std::error::Error>> {
    if is_lesson_file(&cli.input) {
        return Ok(read_lesson_file(&cli.input)?);
    }

    let upload_path = cli
        .upload_path
        .clone()
        .unwrap_or_else(|| profile.upload_path().to_string());
    let mut service_config = ServiceConfig::new(&cli.service_url, upload_path);
    service_config.timeout_secs = cli.timeout;

    eprintln!("Segmenting {} ...", cli.input.display());
    let client = HttpSegmentationClient::new(service_config)?;
    LoadLessonUseCase::new(Box::new(client)).execute(&cli.input)
}

fn build_player(lesson: &Lesson, silent: bool) -> Box<dyn MediaPlayer> {
    let simulated = || -> Box<dyn MediaPlayer> {
        let end = lesson.segments().last().map(|s| s.end).unwrap_or(0.0);
        Box::new(SimulatedMediaPlayer::new(end, SystemClock::new()))
    };
    if silent {
        return simulated();
    }

    let bytes = match fetch_audio(lesson.audio_source(), Some(Box::new(download_progress))) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("{e}; continuing without sound");
            return simulated();
        }
    };
    eprintln!();
    match RodioMediaPlayer::from_bytes(bytes) {
        Ok(player) => Box::new(player),
        Err(e) => {
            log::warn!("{e}; continuing without sound");
            simulated()
        }
    }
}

fn practice(session: &mut DictationSession) -> Result<(), Box<dyn std::error::Error>> {
    let lines = spawn_stdin_reader();
    let ticker = crossbeam_channel::tick(session.poll_interval());
    prompt()?;

    loop {
        select! {
            recv(lines) -> line => {
                let Ok(line) = line else {
                    break;
                };
                if let Flow::Quit = handle_line(session, line.trim()) {
                    break;
                }
                prompt()?;
            }
            recv(ticker) -> _ => session.tick(),
        }
    }
    session.pause();
    Ok(())
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = crossbeam_channel::unbounded::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn handle_line(session: &mut DictationSession, line: &str) -> Flow {
    if let Some(command) = line.strip_prefix(':') {
        return handle_command(session, command.trim());
    }
    for word in line.split_whitespace() {
        if session.is_segment_completed() {
            break;
        }
        let outcome = feed_word(session, word);
        report(session, outcome);
    }
    Flow::Continue
}

/// Type one word into a fresh field and confirm it.
fn feed_word(session: &mut DictationSession, word: &str) -> MatchOutcome {
    match session.input(word) {
        MatchOutcome::Partial => session.submit(),
        outcome => outcome,
    }
}

fn report(session: &DictationSession, outcome: MatchOutcome) {
    match outcome {
        MatchOutcome::Accepted {
            segment_completed, ..
        } => {
            println!("  {}", session.confirmed_tokens().join(" "));
            if segment_completed {
                print_reveal(session);
            }
        }
        MatchOutcome::Rejected(mismatch) => println!("  {mismatch}"),
        MatchOutcome::Ignored | MatchOutcome::Cleared | MatchOutcome::Partial => {}
    }
}

fn handle_command(session: &mut DictationSession, command: &str) -> Flow {
    match command {
        "q" | "quit" => return Flow::Quit,
        "p" | "play" => session.play_current(),
        "pause" => {
            session.pause();
            if let Some(position) = session.playback_position() {
                println!("  Paused at {position:.1}s");
            }
        }
        "l" | "loop" => {
            let enabled = session.toggle_loop();
            println!("  Loop {}", if enabled { "on" } else { "off" });
        }
        "n" | "next" => match session.next() {
            Ok(Advance::Moved(_)) => print_segment_header(session),
            Ok(Advance::LessonCompleted) => {
                println!("\nLesson complete! Well done.");
                return Flow::Quit;
            }
            Err(e) => println!("  {e}"),
        },
        "b" | "prev" => match session.previous() {
            Ok(_) => print_segment_header(session),
            Err(e) => println!("  {e}"),
        },
        "s" | "show" => {
            if session.toggle_transcript() {
                let segment = session.current_segment();
                println!("  {}", segment.transcript);
                if let Some(translation) = &segment.translation {
                    println!("  {translation}");
                }
            } else {
                println!("  Transcript hidden");
            }
        }
        "h" | "hint" => match session.hint() {
            Some(hint) => {
                let gloss = hint
                    .annotation
                    .map(|a| {
                        let parts: Vec<String> =
                            [a.phonetic, a.meaning].into_iter().flatten().collect();
                        format!(" ({})", parts.join(", "))
                    })
                    .unwrap_or_default();
                println!("  Word {}: {}{gloss}", hint.index + 1, hint.token);
            }
            None => println!("  Sentence complete, type :next"),
        },
        "?" | "help" => print_help(),
        other => println!("  Unknown command :{other} (type :help)"),
    }
    Flow::Continue
}

fn print_segment_header(session: &DictationSession) {
    let (current, total) = session.progress();
    let segment = session.current_segment();
    println!(
        "\nSentence {current} of {total}  [{:.2}s - {:.2}s]  {} words",
        segment.start,
        segment.end,
        session.expected_token_count()
    );
    if session.is_segment_completed() {
        print_reveal(session);
    }
}

fn print_reveal(session: &DictationSession) {
    let Some(reveal) = session.completion_reveal() else {
        return;
    };
    println!("  Correct! {}", reveal.transcript);
    if let Some(translation) = reveal.translation {
        println!("  {translation}");
    }
    for a in reveal.annotations {
        println!(
            "    {} {} {}",
            a.word,
            a.phonetic.as_deref().unwrap_or(""),
            a.meaning.as_deref().unwrap_or("")
        );
    }
    println!("  Type :next to continue");
}

fn print_help() {
    println!("Type the words you hear. Commands:");
    println!("  :play  replay sentence    :pause         :loop  toggle looping");
    println!("  :next  next sentence      :prev          :show  toggle transcript");
    println!("  :hint  reveal next word   :quit");
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !is_lesson_file(&cli.input) && !is_audio(&cli.input) {
        return Err(format!(
            "Input must be an audio file ({}) or a .{LESSON_FILE_EXTENSION} lesson",
            AUDIO_EXTENSIONS.join(", ")
        )
        .into());
    }
    if !["english", "chinese"].contains(&cli.profile.as_str()) {
        return Err(format!(
            "Profile must be 'english' or 'chinese', got '{}'",
            cli.profile
        )
        .into());
    }
    if !["prefix", "word"].contains(&cli.granularity.as_str()) {
        return Err(format!(
            "Granularity must be 'prefix' or 'word', got '{}'",
            cli.granularity
        )
        .into());
    }
    if !["drop", "flag"].contains(&cli.revert.as_str()) {
        return Err(format!("Revert must be 'drop' or 'flag', got '{}'", cli.revert).into());
    }
    if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&cli.poll_interval_ms) {
        return Err(format!(
            "Poll interval must be between {MIN_POLL_INTERVAL_MS} and {MAX_POLL_INTERVAL_MS} ms, got {}",
            cli.poll_interval_ms
        )
        .into());
    }
    if cli.timeout == 0 {
        return Err("Timeout must be at least 1 second".into());
    }
    Ok(())
}

fn has_extension(path: &Path, candidates: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| candidates.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_lesson_file(path: &Path) -> bool {
    has_extension(path, &[LESSON_FILE_EXTENSION])
}

fn is_audio(path: &Path) -> bool {
    has_extension(path, AUDIO_EXTENSIONS)
}

fn parse_profile(profile: &str) -> LanguageProfile {
    if profile == "chinese" {
        LanguageProfile::Unsegmented
    } else {
        LanguageProfile::English
    }
}

fn parse_granularity(granularity: &str) -> MatchGranularity {
    if granularity == "word" {
        MatchGranularity::WholeWord
    } else {
        MatchGranularity::CharacterPrefix
    }
}

fn parse_revert(revert: &str) -> RevertPolicy {
    if revert == "flag" {
        RevertPolicy::FlagOnly
    } else {
        RevertPolicy::DropLastChar
    }
}

fn download_progress(received: u64, total: u64) {
    if total > 0 {
        let pct = (received as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading lesson audio... {pct}%");
    } else {
        eprint!("\rDownloading lesson audio... {received} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dictation_core::lesson::domain::lesson::AudioSource;
    use dictation_core::lesson::domain::segment::Segment;
    use dictation_core::playback::infrastructure::simulated_media_player::ManualClock;
    use dictation_core::session::session_logger::NullSessionLogger;

    fn session(config: SessionConfig) -> DictationSession {
        let lesson = Lesson::new(
            "t",
            AudioSource::Url("http://localhost/a.mp3".into()),
            vec![Segment::new(0.0, 2.0, "She is in the living room.")],
        )
        .unwrap();
        DictationSession::new(
            lesson,
            Box::new(SimulatedMediaPlayer::new(2.0, ManualClock::new())),
            config,
            Box::new(NullSessionLogger),
        )
    }

    #[test]
    fn test_typed_line_completes_sentence() {
        let mut s = session(SessionConfig::default());
        handle_line(&mut s, "She is in the living room");
        assert!(s.is_segment_completed());
    }

    #[test]
    fn test_partial_word_is_flagged_as_wrong_word() {
        let mut s = session(SessionConfig::default());
        let outcome = feed_word(&mut s, "sh");
        assert!(matches!(outcome, MatchOutcome::Rejected(_)));
        assert!(s.confirmed_tokens().is_empty());
    }

    #[test]
    fn test_whole_word_mode_accepts_words() {
        let mut s = session(SessionConfig {
            granularity: MatchGranularity::WholeWord,
            ..Default::default()
        });
        assert!(matches!(
            feed_word(&mut s, "She"),
            MatchOutcome::Accepted { .. }
        ));
    }

    #[test]
    fn test_quit_command_stops_loop() {
        let mut s = session(SessionConfig::default());
        assert!(matches!(handle_command(&mut s, "quit"), Flow::Quit));
        assert!(matches!(handle_command(&mut s, "hint"), Flow::Continue));
    }

    #[test]
    fn test_pause_command_stops_playback() {
        let mut s = session(SessionConfig::default());
        assert!(s.is_playing());
        assert!(matches!(handle_command(&mut s, "pause"), Flow::Continue));
        assert!(!s.is_playing());
        assert!(s.playback_position().is_some());
    }

    #[test]
    fn test_extension_checks() {
        assert!(is_lesson_file(Path::new("lesson.JSON")));
        assert!(is_audio(Path::new("talk.mp3")));
        assert!(!is_audio(Path::new("notes.txt")));
    }

    #[test]
    fn test_option_parsing() {
        assert_eq!(parse_profile("chinese"), LanguageProfile::Unsegmented);
        assert_eq!(parse_granularity("word"), MatchGranularity::WholeWord);
        assert_eq!(parse_revert("flag"), RevertPolicy::FlagOnly);
        assert_eq!(parse_revert("drop"), RevertPolicy::DropLastChar);
    }
}
