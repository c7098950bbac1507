use crate::collection::{Collection, CollectionError, Keyed, Pinnable};
use crate::model::generate_id;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Entries whose `book_id` is `None` live here.
pub const DEFAULT_BOOK_ID: &str = "daily-log";

pub type Books = Collection<JournalBook>;
pub type Entries = Collection<JournalEntry>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JournalBook {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    /// Derived from the entry list on load; never trusted from storage.
    #[serde(default)]
    pub entry_count: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    #[serde(default)]
    pub book_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pinned: bool,
}

impl Keyed for JournalBook {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for JournalEntry {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Pinnable for JournalEntry {
    fn is_pinned(&self) -> bool {
        self.pinned
    }

    fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }
}

impl JournalEntry {
    pub fn book(&self) -> &str {
        self.book_id.as_deref().unwrap_or(DEFAULT_BOOK_ID)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum JournalError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("journal book not found: {0}")]
    UnknownBook(String),
    #[error("the default book cannot be removed")]
    DefaultBookProtected,
    #[error(transparent)]
    Collection(#[from] CollectionError),
}

pub fn seed_books() -> Books {
    Collection::new(vec![
        book(DEFAULT_BOOK_ID, "Daily Log", "What happened today", "amber", "notebook"),
        book("ideas", "Ideas", "Half-baked and fully-baked ideas", "violet", "lightbulb"),
        book("lessons", "Lessons", "Things learned the hard way", "emerald", "graduation-cap"),
    ])
}

pub fn seed_entries() -> Entries {
    Collection::new(vec![JournalEntry {
        id: "welcome".to_string(),
        book_id: None,
        title: "Welcome to your journal".to_string(),
        content: "Capture one honest sentence about today.".to_string(),
        date: "2024-01-01T00:00:00Z".to_string(),
        pinned: true,
    }])
}

fn book(id: &str, title: &str, description: &str, color: &str, icon: &str) -> JournalBook {
    JournalBook {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        color: color.to_string(),
        icon: icon.to_string(),
        entry_count: 0,
    }
}

/// Recomputes every book's `entry_count`. Returns true if any count changed.
pub fn refresh_entry_counts(books: &mut Books, entries: &Entries) -> bool {
    let mut changed = false;
    books.for_each_mut(|b| {
        let count = entries.iter().filter(|e| e.book() == b.id).count();
        changed |= b.entry_count != count;
        b.entry_count = count;
    });
    changed
}

pub fn add_book(
    books: &mut Books,
    title: &str,
    description: &str,
    color: &str,
    icon: &str,
) -> Result<String, JournalError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(JournalError::EmptyTitle);
    }
    let new = JournalBook {
        id: generate_id(),
        title: title.to_string(),
        description: description.to_string(),
        color: color.to_string(),
        icon: icon.to_string(),
        entry_count: 0,
    };
    let id = new.id.clone();
    books.append(new)?;
    Ok(id)
}

pub fn rename_book(books: &mut Books, id: &str, title: &str) -> Result<(), JournalError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(JournalError::EmptyTitle);
    }
    books.update(id, |b| b.title = title.to_string())?;
    Ok(())
}

/// Removes a book and every entry filed in it.
pub fn remove_book(
    books: &mut Books,
    entries: &mut Entries,
    id: &str,
) -> Result<(JournalBook, usize), JournalError> {
    if id == DEFAULT_BOOK_ID {
        return Err(JournalError::DefaultBookProtected);
    }
    let removed = books.remove(id)?;
    let dropped = entries.retain(|e| e.book() != id);
    Ok((removed, dropped))
}

/// New entry at the top of the list, dated now.
pub fn add_entry(
    books: &mut Books,
    entries: &mut Entries,
    book_id: Option<&str>,
    title: &str,
    content: &str,
) -> Result<String, JournalError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(JournalError::EmptyTitle);
    }
    let book_id = book_id.filter(|id| *id != DEFAULT_BOOK_ID);
    if let Some(id) = book_id {
        if !books.contains(id) {
            return Err(JournalError::UnknownBook(id.to_string()));
        }
    }
    let entry = JournalEntry {
        id: generate_id(),
        book_id: book_id.map(str::to_string),
        title: title.to_string(),
        content: content.to_string(),
        date: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        pinned: false,
    };
    let id = entry.id.clone();
    entries.prepend(entry)?;
    refresh_entry_counts(books, entries);
    Ok(id)
}

pub fn edit_entry(
    entries: &mut Entries,
    id: &str,
    title: Option<&str>,
    content: Option<&str>,
) -> Result<(), JournalError> {
    if let Some(t) = title {
        if t.trim().is_empty() {
            return Err(JournalError::EmptyTitle);
        }
    }
    entries.update(id, |e| {
        if let Some(t) = title {
            e.title = t.trim().to_string();
        }
        if let Some(c) = content {
            e.content = c.to_string();
        }
    })?;
    Ok(())
}

pub fn remove_entry(
    books: &mut Books,
    entries: &mut Entries,
    id: &str,
) -> Result<JournalEntry, JournalError> {
    let removed = entries.remove(id)?;
    refresh_entry_counts(books, entries);
    Ok(removed)
}

/// Entries of one book, pinned first.
pub fn entries_in<'a>(entries: &'a Entries, book_id: &str) -> Vec<&'a JournalEntry> {
    entries
        .pinned_first()
        .into_iter()
        .filter(|e| e.book() == book_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_counts_are_derived_on_refresh() {
        let mut books = seed_books();
        let entries = seed_entries();
        assert!(refresh_entry_counts(&mut books, &entries));
        assert_eq!(books.get(DEFAULT_BOOK_ID).unwrap().entry_count, 1);
        assert!(!refresh_entry_counts(&mut books, &entries));
    }

    #[test]
    fn stored_counts_are_not_trusted() {
        let mut books = seed_books();
        books.update("ideas", |b| b.entry_count = 99).unwrap();
        refresh_entry_counts(&mut books, &Collection::default());
        assert_eq!(books.get("ideas").unwrap().entry_count, 0);
    }

    #[test]
    fn add_entry_prepends_and_counts() {
        let mut books = seed_books();
        let mut entries = seed_entries();
        let id = add_entry(&mut books, &mut entries, Some("ideas"), "Marketplace", "two-sided").unwrap();
        assert_eq!(entries.items()[0].id, id);
        assert_eq!(books.get("ideas").unwrap().entry_count, 1);
        assert_eq!(
            add_entry(&mut books, &mut entries, Some("ghost"), "x", ""),
            Err(JournalError::UnknownBook("ghost".into()))
        );
    }

    #[test]
    fn default_book_id_is_stored_as_none() {
        let mut books = seed_books();
        let mut entries = seed_entries();
        let id = add_entry(&mut books, &mut entries, Some(DEFAULT_BOOK_ID), "Standup", "").unwrap();
        assert_eq!(entries.get(&id).unwrap().book_id, None);
        assert_eq!(entries_in(&entries, DEFAULT_BOOK_ID).len(), 2);
    }

    #[test]
    fn remove_book_cascades_entries() {
        let mut books = seed_books();
        let mut entries = seed_entries();
        add_entry(&mut books, &mut entries, Some("lessons"), "Hire slow", "").unwrap();
        add_entry(&mut books, &mut entries, Some("lessons"), "Fire fast", "").unwrap();
        let (book, dropped) = remove_book(&mut books, &mut entries, "lessons").unwrap();
        assert_eq!(book.id, "lessons");
        assert_eq!(dropped, 2);
        assert_eq!(entries.len(), 1);
        assert_eq!(
            remove_book(&mut books, &mut entries, DEFAULT_BOOK_ID),
            Err(JournalError::DefaultBookProtected)
        );
    }

    #[test]
    fn pinned_entries_list_first() {
        let mut books = seed_books();
        let mut entries = Collection::default();
        let a = add_entry(&mut books, &mut entries, None, "a", "").unwrap();
        let b = add_entry(&mut books, &mut entries, None, "b", "").unwrap();
        entries.toggle_pin(&a).unwrap();
        let order: Vec<&str> = entries_in(&entries, DEFAULT_BOOK_ID)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(order, vec![a.as_str(), b.as_str()]);
    }
}
