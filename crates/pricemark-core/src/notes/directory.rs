use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{appended, NewNote, Note, NoteId, NoteStore, NoteStoreError};

const FRONT_MATTER_FENCE: &str = "---";

/// Markdown files in one directory, `<id>.md` each.
///
/// Tags live in an optional front matter block:
///
/// ```text
/// ---
/// tags: abo, streaming
/// ---
/// # Netflix
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryNoteStore {
    root: PathBuf,
}

impl DirectoryNoteStore {
    /// Opens `root`, creating it when missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, NoteStoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| NoteStoreError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &NoteId) -> PathBuf {
        self.root.join(format!("{id}.md"))
    }

    fn read_note(&self, id: &NoteId) -> Result<Note, NoteStoreError> {
        let path = self.path_for(id);
        let raw = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                NoteStoreError::NotFound { id: id.clone() }
            } else {
                NoteStoreError::Io { path, source }
            }
        })?;

        let (tags, content) = split_front_matter(&raw);
        Ok(Note {
            id: id.clone(),
            content: content.to_owned(),
            tags,
        })
    }

    fn write_note(&self, id: &NoteId, tags: &[String], content: &str) -> Result<(), NoteStoreError> {
        let path = self.path_for(id);
        debug!(path = %path.display(), "writing note");
        fs::write(&path, render_document(tags, content))
            .map_err(|source| NoteStoreError::Io { path, source })
    }
}

impl NoteStore for DirectoryNoteStore {
    fn load(&self, id: &NoteId) -> Result<Note, NoteStoreError> {
        self.read_note(id)
    }

    fn append(&self, id: &NoteId, text: &str) -> Result<(), NoteStoreError> {
        let note = self.read_note(id)?;
        self.write_note(id, &note.tags, &appended(&note.content, text))
    }

    fn replace(&self, id: &NoteId, content: &str) -> Result<(), NoteStoreError> {
        let note = self.read_note(id)?;
        self.write_note(id, &note.tags, content)
    }

    fn create(&self, note: NewNote) -> Result<NoteId, NoteStoreError> {
        let title = note.content.lines().next().unwrap_or_default();
        let mut id = NoteId::generate(title);
        while self.path_for(&id).exists() {
            id = NoteId::generate(title);
        }
        self.write_note(&id, &note.tags, &note.content)?;
        Ok(id)
    }

    fn tagged(&self, tag: &str) -> Result<Vec<Note>, NoteStoreError> {
        let entries = fs::read_dir(&self.root).map_err(|source| NoteStoreError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut notes = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| NoteStoreError::Io {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
                continue;
            }
            // Files whose stem is not a valid id were not written by this store.
            let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| NoteId::parse(stem).ok())
            else {
                continue;
            };

            let note = self.read_note(&id)?;
            if note.has_tag(tag) {
                notes.push(note);
            }
        }

        notes.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(notes)
    }
}

fn split_front_matter(raw: &str) -> (Vec<String>, &str) {
    let Some(rest) = raw
        .strip_prefix(FRONT_MATTER_FENCE)
        .and_then(|rest| rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")))
    else {
        return (Vec::new(), raw);
    };

    let mut tags = Vec::new();
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        let trimmed = line.trim();
        if trimmed == FRONT_MATTER_FENCE {
            return (tags, &rest[offset..]);
        }
        if let Some(values) = trimmed.strip_prefix("tags:") {
            tags.extend(
                values
                    .split(',')
                    .map(|tag| tag.trim().trim_matches(|ch| ch == '[' || ch == ']').trim())
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_owned),
            );
        }
    }

    // Unterminated block: treat the whole file as content.
    (Vec::new(), raw)
}

fn render_document(tags: &[String], content: &str) -> String {
    if tags.is_empty() {
        return content.to_owned();
    }
    format!(
        "{FRONT_MATTER_FENCE}\ntags: {}\n{FRONT_MATTER_FENCE}\n{content}",
        tags.join(", ")
    )
}
