//! Terminal styling.

use colored::Colorize;

pub(crate) struct Theme;

impl Theme {
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    pub(crate) fn success(text: &str) -> String {
        format!("{} {}", "✓".green(), text)
    }

    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "✗".red(), text.red())
    }

    pub(crate) fn warning(text: &str) -> String {
        format!("{} {}", "!".yellow(), text.yellow())
    }

    pub(crate) fn dimmed(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    pub(crate) fn separator() -> String {
        "━".repeat(50).dimmed().to_string()
    }

    /// A proposed command, framed so it stands out from model text.
    pub(crate) fn approval_box(command: &str, reason: &str, cwd: Option<&str>) -> String {
        let mut lines = vec![
            Self::separator(),
            format!("{} {}", "Command:".bold().yellow(), command.bold()),
            format!("{} {}", "Reason: ".bold(), reason),
        ];
        if let Some(dir) = cwd {
            lines.push(format!("{} {}", "Cwd:    ".bold(), dir));
        }
        lines.push(Self::separator());
        lines.join("\n")
    }
}
