//! # Note Storage
//!
//! Workflows read and write notes only through [`NoteStore`].
//!
//! | Store | Backing |
//! |-------|---------|
//! | [`MemoryNoteStore`] | in-process map, for tests and embedding |
//! | [`DirectoryNoteStore`] | one markdown file per note |

mod directory;
mod memory;

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ValidationError;

pub use directory::DirectoryNoteStore;
pub use memory::MemoryNoteStore;

const MAX_NOTE_ID_LEN: usize = 128;
const MAX_SLUG_LEN: usize = 60;

/// File-safe note identifier: `[A-Za-z0-9._-]`, not starting with `.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteId(String);

impl NoteId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let valid = !trimmed.is_empty()
            && trimmed.len() <= MAX_NOTE_ID_LEN
            && !trimmed.starts_with('.')
            && trimmed
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'));

        if !valid {
            return Err(ValidationError::InvalidNoteId {
                value: input.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Derives a fresh id from a note title: a slug plus a short random suffix.
    pub fn generate(title: &str) -> Self {
        let mut slug = String::with_capacity(title.len());
        for ch in title.trim_start_matches('#').trim().chars() {
            if ch.is_ascii_alphanumeric() || ch == '.' {
                slug.push(ch);
            } else if !slug.ends_with('-') {
                slug.push('-');
            }
            if slug.len() >= MAX_SLUG_LEN {
                break;
            }
        }
        let slug = slug.trim_matches(|ch| ch == '-' || ch == '.');
        let slug = if slug.is_empty() { "note" } else { slug };

        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{slug}-{}", &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NoteId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NoteId> for String {
    fn from(value: NoteId) -> Self {
        value.0
    }
}

/// A stored note. The first line of `content` is its title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    pub tags: Vec<String>,
}

impl Note {
    pub fn title(&self) -> &str {
        self.content.lines().next().unwrap_or_default().trim()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = normalize_tag(tag);
        self.tags.iter().any(|own| normalize_tag(own) == wanted)
    }
}

/// Content and tags for a note that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
    pub content: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Error)]
pub enum NoteStoreError {
    #[error("note '{id}' does not exist")]
    NotFound { id: NoteId },
    #[error(transparent)]
    InvalidId(#[from] ValidationError),
    #[error("note storage failed at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Note persistence capability used by the workflows.
pub trait NoteStore: Send + Sync {
    fn load(&self, id: &NoteId) -> Result<Note, NoteStoreError>;

    /// Appends `text` to the end of the note body, tags untouched.
    fn append(&self, id: &NoteId, text: &str) -> Result<(), NoteStoreError>;

    /// Replaces the note body, tags untouched.
    fn replace(&self, id: &NoteId, content: &str) -> Result<(), NoteStoreError>;

    fn create(&self, note: NewNote) -> Result<NoteId, NoteStoreError>;

    /// Notes carrying `tag` (case-insensitive, leading `#` ignored), ordered by id.
    fn tagged(&self, tag: &str) -> Result<Vec<Note>, NoteStoreError>;
}

pub(crate) fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').to_lowercase()
}

pub(crate) fn appended(content: &str, text: &str) -> String {
    let mut updated = String::with_capacity(content.len() + text.len() + 1);
    updated.push_str(content);
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(text);
    updated
}
