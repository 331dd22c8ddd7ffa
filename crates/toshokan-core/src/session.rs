//! The owned catalog session: the single dispatch point for mutations.

use std::fs;
use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::command::{Command, OpenTarget, Outcome};
use crate::config::{LibraryPaths, TagLabels, ToshokanConfig};
use crate::entry::Entry;
use crate::error::{EditError, InteractionError, Result, ToshokanError};
use crate::export::export_bibliography;
use crate::filename::{split_extension, stem, with_extension, FilenameCodec};
use crate::interaction::{EditField, EditKind, EditSession, Interaction};
use crate::reconcile::{scan_directory, ReconcileReport, Reconciler, Reconciliation};
use crate::store::CatalogStore;
use crate::tags::{TagFilter, TagIndex};
use crate::view::{self, ViewRow};

/// Catalog, persistence and interaction state for one running program.
pub struct Session {
    catalog: Catalog,
    store: Box<dyn CatalogStore>,
    config: ToshokanConfig,
    codec: FilenameCodec,
    reconciler: Reconciler,
    interaction: Interaction,
    /// The in-memory catalog has changes the store has not accepted yet
    dirty: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("entries", &self.catalog.len())
            .field("paths", &self.config.paths)
            .field("interaction", &self.interaction)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl Session {
    /// Load the catalog, reconcile it with the document directory and save
    /// it when the reconcile changed anything.
    pub fn open(
        config: ToshokanConfig,
        store: Box<dyn CatalogStore>,
    ) -> Result<(Self, ReconcileReport)> {
        let codec = config.filename.codec();
        let mut session = Self {
            catalog: Catalog::new(),
            store,
            config,
            codec,
            reconciler: Reconciler::new(codec),
            interaction: Interaction::new(),
            dirty: false,
        };
        let report = session.refresh()?;
        Ok((session, report))
    }

    /// Run `command` if the focus/modal state allows it.
    ///
    /// A rejected command changes nothing.
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        self.interaction.permits(&command)?;

        match command {
            Command::SwitchFocus => Ok(Outcome::FocusChanged(self.interaction.toggle_focus())),
            Command::Refresh => self.refresh().map(Outcome::Refreshed),
            Command::ToggleRead { id } => {
                let entry = self.entry_mut(&id)?;
                entry.read = !entry.read;
                self.persist()?;
                Ok(Outcome::Updated { id })
            }
            Command::BeginEdit { id, kind } => {
                let session = EditSession::new(id.as_str(), kind, self.entry(&id)?);
                self.interaction.begin_edit(session);
                Ok(Outcome::EditStarted(kind))
            }
            Command::EditField { field, value } => {
                if let Some(edit) = self.interaction.edit_mut() {
                    edit.draft.set(field, value);
                }
                Ok(Outcome::DraftUpdated)
            }
            Command::SaveEdit => self.commit_edit(),
            Command::CancelEdit => {
                self.interaction.finish_edit();
                Ok(Outcome::Cancelled)
            }
            Command::Open { id, target } => {
                self.entry(&id)?;
                let path = self.path_for(&id, target);
                Ok(Outcome::Launch { target, path })
            }
            Command::Export {
                filter,
                destination,
            } => {
                let rows = view::project(&self.catalog, &filter);
                export_bibliography(
                    &rows,
                    &self.config.paths.bibs,
                    &self.config.filename.bib_extension,
                    &destination,
                )
                .map(Outcome::Exported)
            }
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn config(&self) -> &ToshokanConfig {
        &self.config
    }

    pub fn paths(&self) -> &LibraryPaths {
        &self.config.paths
    }

    pub fn labels(&self) -> &TagLabels {
        &self.config.tags
    }

    /// Panel text for `filter`.
    /// Whether a save failed and the catalog file is behind the session.
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    pub fn tag_label<'a>(&'a self, filter: &'a TagFilter) -> &'a str {
        filter.label(&self.config.tags)
    }

    pub fn tag_index(&self) -> TagIndex {
        TagIndex::derive(&self.catalog)
    }

    /// Tag panel contents, pseudo-tags first.
    pub fn tag_filters(&self) -> Vec<TagFilter> {
        self.tag_index().filters()
    }

    /// Entries for `filter`, sorted for display.
    pub fn view(&self, filter: &TagFilter) -> Vec<ViewRow<'_>> {
        view::project(&self.catalog, filter)
    }

    pub fn entry(&self, id: &str) -> Result<&Entry> {
        self.catalog
            .get(id)
            .ok_or_else(|| ToshokanError::NotFound(id.to_string()))
    }

    /// Where the file of `target` kind for entry `id` lives.
    pub fn path_for(&self, id: &str, target: OpenTarget) -> PathBuf {
        let paths = &self.config.paths;
        let names = &self.config.filename;
        match target {
            OpenTarget::Document => paths.library.join(id),
            OpenTarget::Notes => paths
                .notes
                .join(with_extension(stem(id), &names.notes_extension)),
            OpenTarget::Bibliography => paths
                .bibs
                .join(with_extension(stem(id), &names.bib_extension)),
        }
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut Entry> {
        self.catalog
            .get_mut(id)
            .ok_or_else(|| ToshokanError::NotFound(id.to_string()))
    }

    fn persist(&mut self) -> Result<()> {
        match self.store.save(&self.catalog) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                self.dirty = true;
                Err(err.into())
            }
        }
    }

    /// Re-read the catalog file, rescan and reconcile.
    ///
    /// Unsaved changes are written first, so the reload cannot discard
    /// them; if that save fails again nothing else happens. Load or scan
    /// failures leave the in-memory catalog untouched.
    fn refresh(&mut self) -> Result<ReconcileReport> {
        if self.dirty {
            self.persist()?;
        }
        let loaded = self.store.load()?;
        let listing = scan_directory(&self.config.paths.library)?;
        let Reconciliation { catalog, report } = self.reconciler.reconcile(&loaded, &listing);

        self.catalog = catalog;
        if !report.is_unchanged() {
            self.persist()?;
        }
        Ok(report)
    }

    /// Apply the open edit's draft.
    ///
    /// A tag edit closes before the save; a failed save leaves the change
    /// in memory for the next save. A metadata edit is all or nothing: on
    /// validation, rename or save failure the files and the catalog are
    /// restored and the edit stays open so it can be fixed or cancelled.
    fn commit_edit(&mut self) -> Result<Outcome> {
        let edit = self
            .interaction
            .edit()
            .cloned()
            .ok_or(InteractionError::NoActiveEdit("save"))?;
        let current = self.entry(&edit.target)?.clone();

        match edit.kind {
            EditKind::Tags => {
                let mut updated = current;
                updated.set_tags(&edit.draft.tags);
                self.catalog.set(edit.target.as_str(), updated);
                self.interaction.finish_edit();
                self.persist()?;
                Ok(Outcome::Saved { id: edit.target })
            }
            EditKind::Metadata => {
                let before = self.catalog.clone();
                let was_dirty = self.dirty;
                let (id, moves) = self.commit_metadata(&edit, current)?;
                if let Err(err) = self.persist() {
                    roll_back(&moves);
                    self.catalog = before;
                    self.dirty = was_dirty;
                    return Err(err);
                }
                self.interaction.finish_edit();
                Ok(Outcome::Saved { id })
            }
        }
    }

    /// Apply a metadata draft to the catalog, renaming files when the id
    /// changes. Returns the new id and the renames done.
    fn commit_metadata(
        &mut self,
        edit: &EditSession,
        current: Entry,
    ) -> Result<(String, Vec<(PathBuf, PathBuf)>)> {
        let draft = &edit.draft;
        validate_metadata(draft.get(EditField::Title), EditField::Title)?;
        validate_metadata(draft.get(EditField::Authors), EditField::Authors)?;
        validate_metadata(draft.get(EditField::Year), EditField::Year)?;

        let mut updated = current.clone();
        updated.title = draft.title.clone();
        updated.authors = draft.authors.clone();
        updated.year = draft.year.clone();

        let identity_changed = updated.title != current.title
            || updated.authors != current.authors
            || updated.year != current.year;
        if !identity_changed {
            self.catalog.set(edit.target.as_str(), updated);
            return Ok((edit.target.clone(), Vec::new()));
        }

        let (_, extension) = split_extension(&edit.target);
        let new_id = self
            .codec
            .encode(&updated.authors, &updated.year, &updated.title, extension);
        if new_id.starts_with('.') {
            return Err(EditError::InvalidField {
                field: EditField::Authors,
                reason: "would produce a hidden filename".to_string(),
            }
            .into());
        }

        let mut moves = Vec::new();
        if new_id != edit.target {
            if self.catalog.contains(&new_id) {
                return Err(EditError::IdConflict {
                    from: edit.target.clone(),
                    to: new_id,
                }
                .into());
            }
            moves = self.rename_backing_files(&edit.target, &new_id)?;
            self.catalog.delete(&edit.target);
            tracing::debug!(from = %edit.target, to = %new_id, "renamed entry files");
        }
        self.catalog.set(new_id.as_str(), updated);
        Ok((new_id, moves))
    }

    /// Move the document and any notes/bibliography files to `new_id`.
    ///
    /// All targets are checked before the first rename; a failed rename
    /// undoes the ones already done. Returns the `(from, to)` pairs moved.
    fn rename_backing_files(
        &self,
        old_id: &str,
        new_id: &str,
    ) -> std::result::Result<Vec<(PathBuf, PathBuf)>, EditError> {
        let mut moves = vec![(
            self.path_for(old_id, OpenTarget::Document),
            self.path_for(new_id, OpenTarget::Document),
        )];
        for target in [OpenTarget::Notes, OpenTarget::Bibliography] {
            let from = self.path_for(old_id, target);
            if from.exists() {
                moves.push((from, self.path_for(new_id, target)));
            }
        }

        if moves.iter().any(|(_, to)| to.exists()) {
            return Err(EditError::IdConflict {
                from: old_id.to_string(),
                to: new_id.to_string(),
            });
        }

        let mut done: Vec<(PathBuf, PathBuf)> = Vec::new();
        for (from, to) in moves {
            if let Err(source) = fs::rename(&from, &to) {
                roll_back(&done);
                return Err(EditError::Rename { from, to, source });
            }
            done.push((from, to));
        }
        Ok(done)
    }
}

fn roll_back(done: &[(PathBuf, PathBuf)]) {
    for (from, to) in done.iter().rev() {
        if let Err(err) = fs::rename(to, from) {
            tracing::debug!(path = %to.display(), error = %err, "rollback rename failed");
        }
    }
}

/// Reject values that cannot be part of a filename or would not decode back.
fn validate_metadata(value: &str, field: EditField) -> std::result::Result<(), EditError> {
    let invalid = |reason: &str| EditError::InvalidField {
        field,
        reason: reason.to_string(),
    };
    if value.contains('/') || value.contains('\\') || value.contains('\0') {
        return Err(invalid("path separators are not allowed"));
    }
    if matches!(field, EditField::Authors | EditField::Year) && value.contains('_') {
        return Err(invalid("underscores separate filename fields"));
    }
    Ok(())
}
