use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{appended, NewNote, Note, NoteId, NoteStore, NoteStoreError};

/// In-process note store.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: Mutex<BTreeMap<NoteId, Note>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a note under an explicit id.
    pub fn insert(&self, id: NoteId, content: impl Into<String>, tags: &[&str]) {
        let note = Note {
            id: id.clone(),
            content: content.into(),
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
        };
        self.notes().insert(id, note);
    }

    pub fn len(&self) -> usize {
        self.notes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes().is_empty()
    }

    pub fn all(&self) -> Vec<Note> {
        self.notes().values().cloned().collect()
    }

    fn notes(&self) -> MutexGuard<'_, BTreeMap<NoteId, Note>> {
        self.notes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NoteStore for MemoryNoteStore {
    fn load(&self, id: &NoteId) -> Result<Note, NoteStoreError> {
        self.notes()
            .get(id)
            .cloned()
            .ok_or_else(|| NoteStoreError::NotFound { id: id.clone() })
    }

    fn append(&self, id: &NoteId, text: &str) -> Result<(), NoteStoreError> {
        let mut notes = self.notes();
        let note = notes
            .get_mut(id)
            .ok_or_else(|| NoteStoreError::NotFound { id: id.clone() })?;
        note.content = appended(&note.content, text);
        Ok(())
    }

    fn replace(&self, id: &NoteId, content: &str) -> Result<(), NoteStoreError> {
        let mut notes = self.notes();
        let note = notes
            .get_mut(id)
            .ok_or_else(|| NoteStoreError::NotFound { id: id.clone() })?;
        content.clone_into(&mut note.content);
        Ok(())
    }

    fn create(&self, note: NewNote) -> Result<NoteId, NoteStoreError> {
        let title = note.content.lines().next().unwrap_or_default().to_owned();
        let mut notes = self.notes();
        let mut id = NoteId::generate(&title);
        while notes.contains_key(&id) {
            id = NoteId::generate(&title);
        }
        notes.insert(
            id.clone(),
            Note {
                id: id.clone(),
                content: note.content,
                tags: note.tags,
            },
        );
        Ok(id)
    }

    fn tagged(&self, tag: &str) -> Result<Vec<Note>, NoteStoreError> {
        Ok(self
            .notes()
            .values()
            .filter(|note| note.has_tag(tag))
            .cloned()
            .collect())
    }
}
