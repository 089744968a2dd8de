//! Gameplay journal written to `logs/game.log`
//!
//! Each line reads `[yyyy-MM-dd HH:mm:ss] [CATEGORY] message`. The journal is
//! installed once per process with [`init`]; until then every helper is a
//! no-op, which keeps simulation code usable from tests and tools.

use chrono::{Local, NaiveDateTime};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::CoreError;

/// Default journal location
pub const DEFAULT_LOG_PATH: &str = "logs/game.log";

static JOURNAL: OnceLock<Mutex<Journal>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Info,
    State,
    Decorator,
    Entity,
    Collision,
    Level,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Info => "INFO",
            Category::State => "STATE",
            Category::Decorator => "DECORATOR",
            Category::Entity => "ENTITY",
            Category::Collision => "COLLISION",
            Category::Level => "LEVEL",
        }
    }
}

/// Format one journal line
pub fn format_line(at: NaiveDateTime, category: Category, message: &str) -> String {
    format!(
        "[{}] [{}] {}",
        at.format("%Y-%m-%d %H:%M:%S"),
        category.label(),
        message
    )
}

/// Append-only journal file
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    file: File,
}

impl Journal {
    /// Open (or create) the journal, creating parent directories as needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&mut self, category: Category, message: &str) -> Result<(), CoreError> {
        let line = format_line(Local::now().naive_local(), category, message);
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }
}

/// Install the process-wide journal. Later calls keep the first journal.
pub fn init(path: impl AsRef<Path>) -> Result<(), CoreError> {
    if JOURNAL.get().is_some() {
        return Ok(());
    }
    let journal = Journal::open(path)?;
    let _ = JOURNAL.set(Mutex::new(journal));
    Ok(())
}

pub fn is_initialized() -> bool {
    JOURNAL.get().is_some()
}

fn record(category: Category, message: &str) {
    if let Some(journal) = JOURNAL.get() {
        if let Ok(mut journal) = journal.lock() {
            let _ = journal.write(category, message);
        }
    }
}

pub fn info(message: &str) {
    record(Category::Info, message);
}

pub fn state_transition(target: &str, from: &str, to: &str) {
    record(Category::State, &format!("{}: {} -> {}", target, from, to));
}

pub fn decorator_applied(name: &str, target: &str, duration: Option<f32>) {
    let message = match duration {
        Some(seconds) => format!("{} applied to {} (duration={:.1}s)", name, target, seconds),
        None => format!("{} applied to {}", name, target),
    };
    record(Category::Decorator, &message);
}

pub fn decorator_removed(name: &str, target: &str) {
    record(Category::Decorator, &format!("{} removed from {}", name, target));
}

pub fn entity_created(kind: &str, id: &str) {
    record(Category::Entity, &format!("CREATED {} [{}]", kind, id));
}

pub fn entity_destroyed(kind: &str, id: &str) {
    record(Category::Entity, &format!("DESTROYED {} [{}]", kind, id));
}

pub fn collision(message: &str) {
    record(Category::Collision, message);
}

pub fn level_change(from: &str, to: &str) {
    record(Category::Level, &format!("{} -> {}", from, to));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_line() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        assert_eq!(
            format_line(at, Category::Decorator, "Aegis Shield removed from Samurai"),
            "[2024-03-09 07:05:01] [DECORATOR] Aegis Shield removed from Samurai"
        );
    }

    #[test]
    fn test_journal_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("game.log");
        let mut journal = Journal::open(&path).unwrap();
        journal.write(Category::Info, "first").unwrap();
        journal.write(Category::Entity, "CREATED Enemy [redDeon]").unwrap();
        drop(journal);

        let mut reopened = Journal::open(&path).unwrap();
        reopened.write(Category::Level, "menu -> level-1").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("] [INFO] first"));
        assert!(lines[1].ends_with("] [ENTITY] CREATED Enemy [redDeon]"));
        assert!(lines[2].ends_with("] [LEVEL] menu -> level-1"));
        assert!(lines[0].starts_with('['));
    }

    #[test]
    fn test_helpers_without_init_are_noops() {
        // Must not panic when no journal has been installed
        if !is_initialized() {
            info("ignored");
            state_transition("Game", "MENU", "PLAYING");
        }
    }
}
