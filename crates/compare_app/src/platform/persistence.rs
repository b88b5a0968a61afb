use std::path::{Path, PathBuf};

use chrono::Utc;
use compare_client::{read_state_file, write_state_file};
use compare_core::{ProductEntry, ResultSet, SessionSnapshot};
use compare_logging::{compare_error, compare_info, compare_warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedProduct {
    id: String,
    title: Option<String>,
    link: Option<String>,
    currency: Option<String>,
    sale_price: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedStore {
    store: String,
    products: Vec<PersistedProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
struct PersistedSession {
    saved_at: String,
    names_list1: Vec<String>,
    names_list2: Vec<String>,
    messages: Vec<String>,
    results: Vec<PersistedStore>,
    active: bool,
    session_id: Option<String>,
}

impl PersistedSession {
    fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let results = snapshot
            .results
            .stores()
            .map(|(store, products)| PersistedStore {
                store: store.to_string(),
                products: products
                    .iter()
                    .map(|(id, entry)| PersistedProduct {
                        id: id.clone(),
                        title: entry.title.clone(),
                        link: entry.link.clone(),
                        currency: entry.currency.clone(),
                        sale_price: entry.sale_price.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            saved_at: Utc::now().to_rfc3339(),
            names_list1: snapshot.names_list1.clone(),
            names_list2: snapshot.names_list2.clone(),
            messages: snapshot.messages.clone(),
            results,
            active: snapshot.active,
            session_id: snapshot.session_id.clone(),
        }
    }

    fn into_snapshot(self) -> SessionSnapshot {
        let mut results = ResultSet::new();
        for store in self.results {
            results.insert_store(store.store.clone());
            for product in store.products {
                results.insert_product(
                    store.store.clone(),
                    product.id,
                    ProductEntry {
                        title: product.title,
                        link: product.link,
                        currency: product.currency,
                        sale_price: product.sale_price,
                    },
                );
            }
        }

        SessionSnapshot {
            names_list1: self.names_list1,
            names_list2: self.names_list2,
            messages: self.messages,
            results,
            active: self.active,
            session_id: self.session_id,
        }
    }
}

/// RON file holding the last session snapshot.
pub(crate) struct SnapshotStore {
    path: PathBuf,
    last_saved: Option<SessionSnapshot>,
}

impl SnapshotStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            last_saved: None,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Missing, unreadable or unparsable files all yield `None`.
    pub(crate) fn load(&mut self) -> Option<SessionSnapshot> {
        let content = match read_state_file(&self.path) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(err) => {
                compare_warn!("Failed to read session state from {:?}: {}", self.path, err);
                return None;
            }
        };

        let persisted: PersistedSession = match ron::from_str(&content) {
            Ok(state) => state,
            Err(err) => {
                compare_warn!("Failed to parse session state from {:?}: {}", self.path, err);
                return None;
            }
        };

        compare_info!(
            "Loaded session state from {:?} saved_at={}",
            self.path,
            persisted.saved_at
        );
        let snapshot = persisted.into_snapshot();
        self.last_saved = Some(snapshot.clone());
        Some(snapshot)
    }

    /// Writes `snapshot` unless it matches what was last loaded or saved.
    pub(crate) fn save(&mut self, snapshot: &SessionSnapshot) {
        if self.last_saved.as_ref() == Some(snapshot) {
            return;
        }

        let persisted = PersistedSession::from_snapshot(snapshot);
        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(&persisted, pretty) {
            Ok(text) => text,
            Err(err) => {
                compare_error!("Failed to serialize session state: {}", err);
                return;
            }
        };

        match write_state_file(&self.path, &content) {
            Ok(()) => self.last_saved = Some(snapshot.clone()),
            Err(err) => {
                compare_error!("Failed to write session state to {:?}: {}", self.path, err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn sample() -> SessionSnapshot {
        let mut results = ResultSet::new();
        results.insert_product(
            "zeta.example.com",
            "p9",
            ProductEntry {
                title: Some("Shoe".into()),
                link: Some("http://x".into()),
                currency: Some("$".into()),
                sale_price: Some("10".into()),
            },
        );
        results.insert_store("alpha.example.com");
        SessionSnapshot {
            names_list1: vec!["boots".into()],
            names_list2: vec!["hat".into(), "hat".into()],
            messages: vec!["a".into(), "b".into()],
            results,
            active: true,
            session_id: Some("42".into()),
        }
    }

    #[test]
    fn snapshot_survives_round_trip_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("session.ron");

        SnapshotStore::new(path.clone()).save(&sample());
        let loaded = SnapshotStore::new(path).load().unwrap();

        assert_eq!(loaded, sample());
        let stores: Vec<&str> = loaded.results.stores().map(|(store, _)| store).collect();
        assert_eq!(stores, vec!["zeta.example.com", "alpha.example.com"]);
    }

    #[test]
    fn missing_or_garbled_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.ron");
        assert!(SnapshotStore::new(path.clone()).load().is_none());

        fs::write(&path, "not ron at all (").unwrap();
        assert!(SnapshotStore::new(path).load().is_none());
    }

    #[test]
    fn unchanged_snapshot_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.ron");
        let mut store = SnapshotStore::new(path.clone());

        store.save(&sample());
        fs::remove_file(&path).unwrap();
        store.save(&sample());
        assert!(!path.exists());

        let mut changed = sample();
        changed.active = false;
        store.save(&changed);
        assert!(path.exists());
    }
}
