use std::time::Duration;

/// A press on a list entry held at least this long removes it.
pub const LONG_PRESS_THRESHOLD: Duration = Duration::from_millis(500);

/// Identity of one inserted entry, stable for the lifetime of its list.
pub type EntryId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListId {
    First,
    Second,
}

impl ListId {
    /// Maps the user-facing list number (1 or 2) to a list.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(ListId::First),
            2 => Some(ListId::Second),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    pub id: EntryId,
    pub name: String,
}

/// Ordered, duplicate-tolerant list of item names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameList {
    entries: Vec<NameEntry>,
    next_id: EntryId,
}

impl Default for NameList {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl NameList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from stored names, skipping blank ones.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for name in names {
            list.add(name.as_ref());
        }
        list
    }

    /// Appends the trimmed value. Blank input is ignored and yields `None`.
    pub fn add(&mut self, raw: &str) -> Option<EntryId> {
        let name = raw.trim();
        if name.is_empty() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(NameEntry {
            id,
            name: name.to_string(),
        });
        Some(id)
    }

    /// Removes exactly the entry with `id`, keeping the order of the rest.
    pub fn remove(&mut self, id: EntryId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Entry id at a zero-based display position.
    pub fn entry_at(&self, index: usize) -> Option<EntryId> {
        self.entries.get(index).map(|entry| entry.id)
    }

    pub fn entries(&self) -> &[NameEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Direct-manipulation gesture aimed at a list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveGesture {
    /// Pointer double activation.
    DoubleActivation,
    /// Touch press held for `held`.
    Press { held: Duration },
}

impl RemoveGesture {
    pub fn triggers_removal(self) -> bool {
        match self {
            RemoveGesture::DoubleActivation => true,
            RemoveGesture::Press { held } => held >= LONG_PRESS_THRESHOLD,
        }
    }
}
