use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::config::VerbosityConfig;
use crate::error::{MakedocError, Result};

/// Message severity, with the token used in log files and console echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Success,
}

impl Severity {
    pub fn token(&self) -> &'static str {
        match self {
            Severity::Info => "[NFO]",
            Severity::Warning => "[WNG]",
            Severity::Error => "[ERR]",
            Severity::Success => "[SCS]",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Success => "SUCCESS",
        }
    }
}

/// One recorded diagnostic, tied to the partial path it concerns.
#[derive(Debug, Clone)]
pub struct Message {
    pub severity: Severity,
    pub code: u16,
    pub path: String,
    pub content: String,
    pub solution: Option<String>,
    pub time: DateTime<Local>,
}

impl Message {
    fn new(
        severity: Severity,
        code: u16,
        path: &str,
        content: String,
        solution: Option<String>,
    ) -> Self {
        Self {
            severity,
            code,
            path: path.to_string(),
            content,
            solution,
            time: Local::now(),
        }
    }

    pub fn parsing_starts(path: &str) -> Self {
        Self::new(
            Severity::Info,
            1,
            path,
            "Makedoc starts to parse documentation".to_string(),
            None,
        )
    }

    pub fn parsing_finished(path: &str) -> Self {
        Self::new(
            Severity::Success,
            999,
            path,
            "Makedoc finished parsing".to_string(),
            None,
        )
    }

    pub fn empty_dirdoc(path: &str) -> Self {
        Self::new(
            Severity::Warning,
            100,
            path,
            "Empty directory documentation".to_string(),
            Some("Use makedoc unpack [DIRPATH] to create the dirdoc file and fill it in".to_string()),
        )
    }

    pub fn empty_docstring(path: &str) -> Self {
        Self::new(
            Severity::Warning,
            101,
            path,
            "Empty file-level docstring".to_string(),
            Some("Fill in the file docstring".to_string()),
        )
    }

    pub fn snippet_already_began(path: &str, name: &str) -> Self {
        Self::new(
            Severity::Warning,
            102,
            path,
            format!("Dynamic snippet '{name}' starts more than once"),
            Some(format!("Remove 'begin:{name}' tokens until there is only one")),
        )
    }

    pub fn snippet_unclosed(path: &str, name: &str) -> Self {
        Self::new(
            Severity::Warning,
            103,
            path,
            format!("Dynamic snippet '{name}' is never closed"),
            Some(format!("Add 'end:{name}' where the snippet ends")),
        )
    }

    pub fn snippet_unreferenced(path: &str, name: &str) -> Self {
        Self::new(
            Severity::Warning,
            104,
            path,
            format!("Dynamic snippet '{name}' is not referenced"),
            Some("Check for all dynamic snippets definitions in the file".to_string()),
        )
    }

    pub fn snippet_undefined(path: &str, name: &str) -> Self {
        Self::new(
            Severity::Warning,
            105,
            path,
            format!("Dynamic snippet '{name}' is not defined"),
            Some(format!("Add 'begin:{name}' and 'end:{name}' markers around the code to inline")),
        )
    }

    fn description(&self) -> String {
        format!(
            "{}  {}: {}",
            self.time.format("%H:%M:%S"),
            self.path,
            self.content
        )
    }

    fn log_file_line(&self) -> String {
        format!("{} {}\n", self.severity.token(), self.description())
    }
}

/// Collects every message of one run, echoes them to the console when the
/// configured verbosity allows it, and writes the per-run log file.
pub struct Reporter {
    start: DateTime<Local>,
    verbosity: VerbosityConfig,
    messages: RefCell<Vec<Message>>,
}

impl Reporter {
    pub fn new(verbosity: VerbosityConfig) -> Self {
        Self {
            start: Local::now(),
            verbosity,
            messages: RefCell::new(Vec::new()),
        }
    }

    /// Record a message. Recording never fails and never interrupts
    /// traversal; fatal conditions go through [`crate::error::MakedocError`]
    /// instead.
    pub fn record(&self, message: Message) {
        let echo = match message.severity {
            Severity::Info => self.verbosity.print_info,
            Severity::Warning => self.verbosity.print_warning,
            Severity::Error => self.verbosity.print_error,
            Severity::Success => self.verbosity.print_success,
        };
        if echo {
            let line = format!("{} {}", message.severity.token(), message.description());
            match message.severity {
                Severity::Warning => warn!("{line}"),
                Severity::Error => error!("{line}"),
                Severity::Info | Severity::Success => info!("{line}"),
            }
        }
        self.messages.borrow_mut().push(message);
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .borrow()
            .iter()
            .filter(|m| m.severity == severity)
            .count()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.borrow().clone()
    }

    /// Write the whole run to a timestamp-named file under `logs_dir`.
    ///
    /// Called once per command, whether or not the command succeeded, so
    /// silent runs stay auditable.
    pub fn save(&self, logs_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(logs_dir)?;
        let path = logs_dir.join(self.start.format("%Y-%m-%d_%H:%M:%S.log").to_string());

        let messages = self.messages.borrow();
        let mut out = String::from(
            "#################################################\n\
             #################  MAKEDOC LOG  #################\n\
             #################################################\n\n",
        );

        out.push_str(&format!(
            "MESSAGE REPORT\n    INFO    : {}\n    SUCCESS : {}\n    WARNING : {}\n    ERROR   : {}\n\n",
            self.count(Severity::Info),
            self.count(Severity::Success),
            self.count(Severity::Warning),
            self.count(Severity::Error),
        ));

        for severity in [
            Severity::Error,
            Severity::Warning,
            Severity::Info,
            Severity::Success,
        ] {
            out.push_str(&details_section(severity, &messages));
        }

        out.push_str("LOG TIMELINE\n");
        for message in messages.iter() {
            out.push_str("    ");
            out.push_str(&message.log_file_line());
        }

        fs::write(&path, out).map_err(|source| MakedocError::WriteFile {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// The per-code breakdown for one severity, empty when no message matches.
fn details_section(severity: Severity, messages: &[Message]) -> String {
    let selected: Vec<&Message> = messages.iter().filter(|m| m.severity == severity).collect();
    if selected.is_empty() {
        return String::new();
    }

    let mut out = match severity {
        Severity::Success => "SUCCESS DETAILS\n".to_string(),
        _ => format!("{}S DETAILS\n", severity.label()),
    };

    let mut codes: Vec<u16> = Vec::new();
    for message in &selected {
        if !codes.contains(&message.code) {
            codes.push(message.code);
        }
    }

    for code in codes {
        let matching: Vec<&&Message> = selected.iter().filter(|m| m.code == code).collect();
        out.push_str(&format!(
            "    {} {} [{:03}]: {}\n",
            matching.len(),
            severity.label(),
            code,
            matching[0].content
        ));
        for message in matching {
            if let Some(solution) = &message.solution {
                out.push_str(&format!("        {solution}\n"));
            }
        }
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn reporter() -> Reporter {
        Reporter::new(VerbosityConfig {
            print_error: false,
            print_info: false,
            print_success: false,
            print_warning: false,
        })
    }

    #[test]
    fn counts_follow_recorded_severities() {
        let reporter = reporter();
        reporter.record(Message::parsing_starts(""));
        reporter.record(Message::empty_docstring("lib/a.py"));
        reporter.record(Message::empty_docstring("lib/b.py"));
        reporter.record(Message::parsing_finished(""));

        assert_eq!(reporter.count(Severity::Info), 1);
        assert_eq!(reporter.count(Severity::Warning), 2);
        assert_eq!(reporter.count(Severity::Success), 1);
        assert_eq!(reporter.count(Severity::Error), 0);
    }

    #[test]
    fn saved_log_has_report_details_and_timeline() {
        let temp = TempDir::new().unwrap();
        let reporter = reporter();
        reporter.record(Message::parsing_starts(""));
        reporter.record(Message::snippet_unclosed("lib/a.py", "demo"));
        reporter.record(Message::parsing_finished(""));

        let path = reporter.save(temp.path()).unwrap();
        let log = std::fs::read_to_string(path).unwrap();

        assert!(log.contains("#################  MAKEDOC LOG  #################"));
        assert!(log.contains("    WARNING : 1\n"));
        assert!(log.contains("WARNINGS DETAILS\n"));
        assert!(log.contains("    1 WARNING [103]: Dynamic snippet 'demo' is never closed\n"));
        assert!(log.contains("        Add 'end:demo' where the snippet ends\n"));
        assert!(log.contains("LOG TIMELINE\n"));
        assert!(log.contains("    [WNG] "));
        assert!(log.contains("lib/a.py: Dynamic snippet 'demo' is never closed\n"));
    }

    #[test]
    fn log_file_name_is_the_run_timestamp() {
        let temp = TempDir::new().unwrap();
        let reporter = reporter();
        let path = reporter.save(temp.path()).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "YYYY-MM-DD_HH:MM:SS.log".len());
    }
}
