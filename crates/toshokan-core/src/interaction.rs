//! Focus and modal-edit state.
//!
//! Two independent axes:
//! - Focus: which panel receives navigation (library table or tag list)
//! - Modal: idle, or editing one entry's fields
//!
//! Every command passes through [`Interaction::permits`] before it runs.
//! While an edit is open only its field edits, save and cancel get through.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::entry::Entry;
use crate::error::InteractionError;

/// The panel holding input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Focus {
    #[default]
    Library,
    Tags,
}

impl Focus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Library => Self::Tags,
            Self::Tags => Self::Library,
        }
    }
}

/// What kind of edit is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditKind {
    /// The `;`-separated tag string
    Tags,
    /// Title, authors and year
    Metadata,
}

impl EditKind {
    /// Fields in form order.
    pub fn fields(self) -> &'static [EditField] {
        match self {
            Self::Tags => &[EditField::Tags],
            Self::Metadata => &[EditField::Title, EditField::Authors, EditField::Year],
        }
    }

    pub fn allows(self, field: EditField) -> bool {
        self.fields().contains(&field)
    }
}

/// An editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditField {
    Tags,
    Title,
    Authors,
    Year,
}

impl EditField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Tags => "Tags (semicolon-separated)",
            Self::Title => "Title",
            Self::Authors => "Authors",
            Self::Year => "Year",
        }
    }
}

/// Pending field values, seeded from the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub authors: String,
    pub year: String,
    pub tags: String,
}

impl Draft {
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            title: entry.title.clone(),
            authors: entry.authors.clone(),
            year: entry.year.clone(),
            tags: entry.tags_string(),
        }
    }

    pub fn get(&self, field: EditField) -> &str {
        match field {
            EditField::Tags => &self.tags,
            EditField::Title => &self.title,
            EditField::Authors => &self.authors,
            EditField::Year => &self.year,
        }
    }

    pub fn set(&mut self, field: EditField, value: String) {
        match field {
            EditField::Tags => self.tags = value,
            EditField::Title => self.title = value,
            EditField::Authors => self.authors = value,
            EditField::Year => self.year = value,
        }
    }
}

/// An open edit on one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub target: String,
    pub kind: EditKind,
    pub draft: Draft,
}

impl EditSession {
    pub fn new(target: impl Into<String>, kind: EditKind, entry: &Entry) -> Self {
        Self {
            target: target.into(),
            kind,
            draft: Draft::from_entry(entry),
        }
    }
}

/// Idle, or editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Modal {
    #[default]
    Idle,
    Editing(EditSession),
}

/// Focus × modal state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interaction {
    focus: Focus,
    modal: Modal,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.modal, Modal::Editing(_))
    }

    pub fn edit(&self) -> Option<&EditSession> {
        match &self.modal {
            Modal::Editing(session) => Some(session),
            Modal::Idle => None,
        }
    }

    /// Check whether `command` may run in the current state.
    pub fn permits(&self, command: &Command) -> Result<(), InteractionError> {
        match &self.modal {
            Modal::Editing(session) => {
                if !command.is_edit_step() {
                    return Err(InteractionError::EditInProgress {
                        command: command.name(),
                        target: session.target.clone(),
                    });
                }
                if let Command::EditField { field, .. } = command {
                    if !session.kind.allows(*field) {
                        return Err(InteractionError::FieldNotEditable {
                            field: *field,
                            kind: session.kind,
                        });
                    }
                }
                Ok(())
            }
            Modal::Idle => {
                if command.is_edit_step() {
                    return Err(InteractionError::NoActiveEdit(command.name()));
                }
                if command.targets_entry() && self.focus != Focus::Library {
                    return Err(InteractionError::WrongFocus(command.name()));
                }
                Ok(())
            }
        }
    }

    pub(crate) fn toggle_focus(&mut self) -> Focus {
        self.focus = self.focus.toggled();
        self.focus
    }

    pub(crate) fn begin_edit(&mut self, session: EditSession) {
        self.modal = Modal::Editing(session);
    }

    pub(crate) fn edit_mut(&mut self) -> Option<&mut EditSession> {
        match &mut self.modal {
            Modal::Editing(session) => Some(session),
            Modal::Idle => None,
        }
    }

    /// Close the edit, returning it.
    pub(crate) fn finish_edit(&mut self) -> Option<EditSession> {
        match std::mem::take(&mut self.modal) {
            Modal::Editing(session) => Some(session),
            Modal::Idle => None,
        }
    }

    /// Display name for the mode indicator badge.
    pub fn display_name(&self) -> &'static str {
        match (&self.modal, self.focus) {
            (Modal::Editing(s), _) if s.kind == EditKind::Tags => "EDIT TAGS",
            (Modal::Editing(_), _) => "EDIT META",
            (Modal::Idle, Focus::Library) => "LIBRARY",
            (Modal::Idle, Focus::Tags) => "TAGS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::command::OpenTarget;
    use crate::tags::TagFilter;

    fn editing(kind: EditKind) -> Interaction {
        let mut state = Interaction::new();
        state.begin_edit(EditSession::new("x_1_y.pdf", kind, &Entry::new("y", "x", "1")));
        state
    }

    #[test]
    fn initial_state() {
        let state = Interaction::new();
        assert_eq!(state.focus(), Focus::Library);
        assert_eq!(state.modal(), &Modal::Idle);
        assert_eq!(state.display_name(), "LIBRARY");
    }

    #[test]
    fn idle_library_allows_entry_commands() {
        let state = Interaction::new();
        assert!(state.permits(&Command::Refresh).is_ok());
        assert!(state.permits(&Command::ToggleRead { id: "a".into() }).is_ok());
        assert!(state
            .permits(&Command::Open {
                id: "a".into(),
                target: OpenTarget::Notes
            })
            .is_ok());
    }

    #[test]
    fn idle_rejects_edit_steps() {
        let state = Interaction::new();
        assert_eq!(
            state.permits(&Command::SaveEdit),
            Err(InteractionError::NoActiveEdit("save"))
        );
        assert!(state.permits(&Command::CancelEdit).is_err());
    }

    #[test]
    fn tag_focus_rejects_entry_commands() {
        let mut state = Interaction::new();
        assert_eq!(state.toggle_focus(), Focus::Tags);
        assert_eq!(
            state.permits(&Command::ToggleRead { id: "a".into() }),
            Err(InteractionError::WrongFocus("toggle read"))
        );
        assert!(state
            .permits(&Command::BeginEdit {
                id: "a".into(),
                kind: EditKind::Tags
            })
            .is_err());
        assert!(state.permits(&Command::Refresh).is_ok());
        assert!(state.permits(&Command::SwitchFocus).is_ok());
        assert_eq!(state.display_name(), "TAGS");
    }

    #[test]
    fn editing_gates_everything_else() {
        let state = editing(EditKind::Tags);
        for command in [
            Command::Refresh,
            Command::SwitchFocus,
            Command::ToggleRead { id: "a".into() },
            Command::Export {
                filter: TagFilter::All,
                destination: PathBuf::from("out.bib"),
            },
        ] {
            assert!(matches!(
                state.permits(&command),
                Err(InteractionError::EditInProgress { .. })
            ));
        }
        assert!(state.permits(&Command::SaveEdit).is_ok());
        assert!(state.permits(&Command::CancelEdit).is_ok());
        assert_eq!(state.display_name(), "EDIT TAGS");
    }

    #[test]
    fn field_must_belong_to_edit_kind() {
        let state = editing(EditKind::Tags);
        let title = Command::EditField {
            field: EditField::Title,
            value: "t".into(),
        };
        assert_eq!(
            state.permits(&title),
            Err(InteractionError::FieldNotEditable {
                field: EditField::Title,
                kind: EditKind::Tags
            })
        );
        assert!(editing(EditKind::Metadata).permits(&title).is_ok());
    }

    #[test]
    fn finish_returns_to_idle() {
        let mut state = editing(EditKind::Metadata);
        state.edit_mut().unwrap().draft.set(EditField::Year, "2000".into());
        let session = state.finish_edit().unwrap();
        assert_eq!(session.draft.get(EditField::Year), "2000");
        assert!(!state.is_editing());
        assert!(state.finish_edit().is_none());
    }

    #[test]
    fn draft_seeded_from_entry() {
        let mut entry = Entry::new("T", "A", "1");
        entry.set_tags("a; b");
        let draft = Draft::from_entry(&entry);
        assert_eq!(draft.tags, "a;b");
        assert_eq!(draft.get(EditField::Authors), "A");
    }
}
