//! Command implementations for mirror-cli

pub mod once;
pub mod run;

pub use once::run_once;
pub use run::run_daemon;

use colored::{ColoredString, Colorize};
use mirror_core::EventKind;

/// Colour an event kind label for console output.
pub(crate) fn styled_kind(kind: EventKind) -> ColoredString {
    let label = kind.as_str();
    match kind {
        EventKind::CreateDir | EventKind::CopyNew => label.green(),
        EventKind::UpdateModified => label.cyan(),
        EventKind::DeleteFile | EventKind::DeleteEmptyDir => label.blue(),
        EventKind::Warning => label.yellow().bold(),
        EventKind::Error => label.red().bold(),
    }
}
