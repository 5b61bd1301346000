//! # CLI Layer
//!
//! One possible client of the daynotes library, and the only place that
//! touches the terminal. Every invocation follows the same shape:
//!
//! 1. Parse arguments and install the log subscriber (stderr only).
//! 2. Start a [`Session`] over the file store, which loads notes and makes
//!    sure today has one.
//! 3. Apply the command.
//! 4. Shut the session down, which completes any pending autosave and
//!    writes what is still unsaved.
//!
//! `format`, `config` and `clear` never load notes.

use super::print::{
    print_days, print_info, print_note, print_notes, print_status, print_success, print_themes,
    print_warning,
};
use super::setup::{Cli, Commands};
use clap::Parser;
use daynotes::autosave::MockRemote;
use daynotes::clock::{Clock, SystemClock};
use daynotes::config::NotesConfig;
use daynotes::dates::parse_day;
use daynotes::error::{NotesError, Result};
use daynotes::persistence::Persistence;
use daynotes::session::Session;
use daynotes::snippets::{Language, detect_language, format_code};
use daynotes::store::fs::FileStore;
use directories::ProjectDirs;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DATA_DIR_ENV: &str = "DAYNOTES_HOME";
const LOG_ENV: &str = "DAYNOTES_LOG";

type AppSession = Session<FileStore, SystemClock, MockRemote>;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let data_dir = data_dir()?;

    match &cli.command {
        Some(Commands::Format { lang, file }) => {
            return handle_format(lang.as_deref(), file.as_deref());
        }
        Some(Commands::Config { key, value }) => {
            return handle_config(&data_dir, key.as_deref(), value.as_deref());
        }
        Some(Commands::Clear) => return handle_clear(&data_dir),
        _ => {}
    }

    let config = load_config(&data_dir);
    tracing::debug!(dir = %data_dir.display(), "Opening notes");
    let store = FileStore::new(data_dir);
    let mut session = Session::start(store, SystemClock, MockRemote::new(), &config);

    let result = match cli.command {
        None | Some(Commands::Today) => handle_today(&mut session),
        Some(Commands::List { date }) => handle_list(&session, date.as_deref()),
        Some(Commands::Days) => handle_days(&session),
        Some(Commands::New { date }) => handle_new(&mut session, date.as_deref()),
        Some(Commands::Select { date, id }) => handle_select(&mut session, &date, id.as_deref()),
        Some(Commands::Show) => handle_show(&session),
        Some(Commands::Write { text }) => handle_write(&mut session, text),
        Some(Commands::Title { title }) => handle_title(&mut session, &title.join(" ")),
        Some(Commands::Delete { date, id }) => handle_delete(&mut session, &date, &id),
        Some(Commands::Theme { name }) => handle_theme(&mut session, name.as_deref()),
        Some(Commands::Format { .. } | Commands::Config { .. } | Commands::Clear) => Ok(()),
    };

    let saved = session.shutdown();
    result?;
    if !saved {
        return Err(NotesError::Store("Notes could not be saved".to_string()));
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "daynotes", "daynotes")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            NotesError::Api(format!(
                "Could not determine a data directory; set {}",
                DATA_DIR_ENV
            ))
        })
}

/// An unreadable config file falls back to defaults so every command,
/// including `config` itself, keeps working. Setting a value rewrites it.
fn load_config(data_dir: &Path) -> NotesConfig {
    NotesConfig::load(data_dir).unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable config, using defaults: {}", e);
        NotesConfig::default()
    })
}

fn handle_today(session: &mut AppSession) -> Result<()> {
    let today = session.notebook.today();
    if session.notebook.selection().date != today {
        session.notebook.select_note(today, None);
    }
    handle_show(session)
}

fn handle_show(session: &AppSession) -> Result<()> {
    let notebook = &session.notebook;
    print_note(
        notebook.selection().date,
        notebook.current_note(),
        notebook.today(),
    );
    Ok(())
}

fn handle_list(session: &AppSession, date: Option<&str>) -> Result<()> {
    let notebook = &session.notebook;
    let date = match date {
        Some(d) => parse_day(d)?,
        None => notebook.selection().date,
    };
    print_notes(
        date,
        notebook.day(date),
        notebook.selection(),
        notebook.today(),
        notebook.clock().now(),
    );
    Ok(())
}

fn handle_days(session: &AppSession) -> Result<()> {
    let notebook = &session.notebook;
    let days: Vec<_> = notebook
        .days()
        .into_iter()
        .map(|date| (date, notebook.day(date).len()))
        .collect();
    print_days(&days, notebook.selection().date, notebook.today());
    Ok(())
}

fn handle_new(session: &mut AppSession, date: Option<&str>) -> Result<()> {
    let date = match date {
        Some(d) => parse_day(d)?,
        None => session.notebook.today(),
    };
    let id = session.notebook.create_note(date);
    print_success(&format!("Created note {} on {}", id, date));
    Ok(())
}

fn handle_select(session: &mut AppSession, date: &str, id: Option<&str>) -> Result<()> {
    let date = parse_day(date)?;
    if let Some(id) = id
        && !session.notebook.day(date).iter().any(|n| n.id == id)
    {
        return Err(NotesError::Api(format!("No note {} on {}", id, date)));
    }
    session.notebook.select_note(date, id);
    handle_show(session)
}

fn handle_write(session: &mut AppSession, text: Option<String>) -> Result<()> {
    let content = match text {
        Some(text) => text,
        None => read_stdin()?,
    };
    if !session.edit(&content) {
        return Err(NotesError::Api("No note is selected".to_string()));
    }
    session.autosave.flush_now(&mut session.notebook, &session.auth);
    print_status(session.save_status());
    Ok(())
}

fn handle_title(session: &mut AppSession, title: &str) -> Result<()> {
    session.notebook.set_current_title(title)?;
    print_success(&format!("Title set to \"{}\"", session.notebook.current_title()));
    Ok(())
}

fn handle_delete(session: &mut AppSession, date: &str, id: &str) -> Result<()> {
    let date = parse_day(date)?;
    if session.notebook.delete_note(date, id) {
        print_success(&format!("Deleted note {} from {}", id, date));
    } else {
        print_warning(&format!("No note {} on {}", id, date));
    }
    Ok(())
}

fn handle_theme(session: &mut AppSession, name: Option<&str>) -> Result<()> {
    match name {
        Some(name) => {
            session.change_theme(name)?;
            print_success(&format!("Theme set to {}", session.theme.current()));
        }
        None => print_themes(session.theme.current()),
    }
    Ok(())
}

fn handle_format(lang: Option<&str>, file: Option<&Path>) -> Result<()> {
    let code = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => read_stdin()?,
    };
    let language = match lang {
        Some(name) => name.parse::<Language>()?,
        None => detect_language(&code),
    };
    tracing::debug!(%language, "Formatting snippet");
    println!("{}", format_code(&code, language));
    Ok(())
}

fn handle_config(data_dir: &Path, key: Option<&str>, value: Option<&str>) -> Result<()> {
    let mut config = load_config(data_dir);
    match (key, value) {
        (None, _) => {
            for key in NotesConfig::keys() {
                println!("{} = {}", key, config.get(key)?);
            }
        }
        (Some(key), None) => println!("{} = {}", key, config.get(key)?),
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save(data_dir)?;
            print_success(&format!("{} = {}", key, config.get(key)?));
        }
    }
    Ok(())
}

fn handle_clear(data_dir: &Path) -> Result<()> {
    let config = load_config(data_dir);
    let persistence =
        Persistence::new(FileStore::new(data_dir.to_path_buf())).with_prefix(&config.key_prefix);
    persistence.clear()?;
    print_info("All notes and preferences removed.");
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(NotesError::Api(
            "Nothing to read: pass text as an argument or pipe it in".to_string(),
        ));
    }
    let mut buffer = String::new();
    stdin.read_to_string(&mut buffer)?;
    Ok(buffer)
}
