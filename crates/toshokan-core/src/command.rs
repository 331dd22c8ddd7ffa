//! Commands accepted by a [`Session`](crate::Session) and their outcomes.

use std::path::PathBuf;

use crate::export::ExportReport;
use crate::interaction::{EditField, EditKind, Focus};
use crate::reconcile::ReconcileReport;
use crate::tags::TagFilter;

/// Which file of an entry to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenTarget {
    /// The document itself, in the viewer
    Document,
    /// `<notes>/<stem>.md`, in the editor
    Notes,
    /// `<bibs>/<stem>.bib`, in the editor
    Bibliography,
}

/// A state-changing request from the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SwitchFocus,
    /// Re-read the catalog file and reconcile it with the document directory
    Refresh,
    ToggleRead { id: String },
    BeginEdit { id: String, kind: EditKind },
    EditField { field: EditField, value: String },
    SaveEdit,
    CancelEdit,
    /// Resolve the path of one of the entry's files
    Open { id: String, target: OpenTarget },
    /// Write the bibliography records of a view to `destination`
    Export { filter: TagFilter, destination: PathBuf },
}

impl Command {
    /// Short name used in rejection messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SwitchFocus => "switch focus",
            Self::Refresh => "refresh",
            Self::ToggleRead { .. } => "toggle read",
            Self::BeginEdit { .. } => "edit",
            Self::EditField { .. } => "field edit",
            Self::SaveEdit => "save",
            Self::CancelEdit => "cancel",
            Self::Open { .. } => "open",
            Self::Export { .. } => "export",
        }
    }

    /// Steps of an open modal edit.
    pub fn is_edit_step(&self) -> bool {
        matches!(self, Self::EditField { .. } | Self::SaveEdit | Self::CancelEdit)
    }

    /// Commands acting on the selected library row.
    pub fn targets_entry(&self) -> bool {
        matches!(
            self,
            Self::ToggleRead { .. } | Self::BeginEdit { .. } | Self::Open { .. }
        )
    }
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    FocusChanged(Focus),
    Refreshed(ReconcileReport),
    /// The entry was changed and the catalog saved
    Updated { id: String },
    EditStarted(EditKind),
    DraftUpdated,
    /// The edit was committed; `id` is the entry's id afterwards
    Saved { id: String },
    Cancelled,
    /// The shell should open `path`
    Launch { target: OpenTarget, path: PathBuf },
    Exported(ExportReport),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(Command::SaveEdit.is_edit_step());
        assert!(!Command::Refresh.is_edit_step());
        assert!(Command::ToggleRead { id: "x".into() }.targets_entry());
        assert!(!Command::SwitchFocus.targets_entry());
        assert_eq!(Command::Refresh.name(), "refresh");
    }
}
