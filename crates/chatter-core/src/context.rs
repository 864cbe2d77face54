//! Persisted conversation context: per-user metadata plus the table of
//! inputs the responder has "learned".
//!
//! The whole document lives in one JSON file and is rewritten on every save.
//! A missing or unreadable file is not an error; the store starts empty.

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{domain::UserId, Result};

/// Learned keys are the lowercased input cut to this many characters.
pub const LEARNED_KEY_CHARS: usize = 50;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default = "default_user_name")]
    pub name: String,
    #[serde(default)]
    pub interaction_count: u64,
    /// Records written without a timestamp read back as the epoch.
    #[serde(default)]
    pub last_seen: DateTime<Utc>,
}

fn default_user_name() -> String {
    "User".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedEntry {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub last_used: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextDocument {
    #[serde(default)]
    pub user_data: BTreeMap<UserId, UserRecord>,
    /// Declared by the file format, never interpreted.
    #[serde(default)]
    pub conversations: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub learned_responses: BTreeMap<String, LearnedEntry>,
}

/// Key under which an input is remembered.
pub fn learned_key(text: &str) -> String {
    text.to_lowercase().chars().take(LEARNED_KEY_CHARS).collect()
}

/// Owner of the context document and its backing file.
///
/// There is exactly one store per bot and it is mutated through `&mut self`,
/// so saves never overlap within a process.
#[derive(Debug)]
pub struct ContextStore {
    path: PathBuf,
    doc: ContextDocument,
    learned_limit: Option<usize>,
}

impl ContextStore {
    /// Load the document at `path`, falling back to an empty one.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = match read_document(&path) {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                debug!(path = %path.display(), "no context file yet, starting empty");
                ContextDocument::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "context file unreadable, starting empty");
                ContextDocument::default()
            }
        };
        Self {
            path,
            doc,
            learned_limit: None,
        }
    }

    pub fn with_learned_limit(mut self, limit: Option<usize>) -> Self {
        self.learned_limit = limit;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &ContextDocument {
        &self.doc
    }

    /// Write the full document. Failures are logged and otherwise ignored.
    pub fn save(&self) {
        if let Err(e) = write_document(&self.path, &self.doc) {
            warn!(path = %self.path.display(), error = %e, "failed to save context");
        }
    }

    /// Record one interaction from `user_id`, creating the record if needed.
    pub fn touch_user(&mut self, user_id: &UserId, name: Option<&str>, now: DateTime<Utc>) {
        let record = self
            .doc
            .user_data
            .entry(user_id.clone())
            .or_insert_with(|| UserRecord {
                name: default_user_name(),
                interaction_count: 0,
                last_seen: now,
            });
        record.interaction_count += 1;
        record.last_seen = now;
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            record.name = name.to_string();
        }
    }

    pub fn user(&self, user_id: &UserId) -> Option<&UserRecord> {
        self.doc.user_data.get(user_id)
    }

    /// Count one more sighting of `text` and return the updated count.
    pub fn learn(&mut self, text: &str, now: DateTime<Utc>) -> u64 {
        let key = learned_key(text);
        let count = {
            let entry = self
                .doc
                .learned_responses
                .entry(key.clone())
                .or_insert(LearnedEntry {
                    count: 0,
                    last_used: now,
                });
            entry.count += 1;
            entry.last_used = now;
            entry.count
        };
        self.evict_learned(&key);
        count
    }

    pub fn learned(&self, text: &str) -> Option<&LearnedEntry> {
        self.doc.learned_responses.get(&learned_key(text))
    }

    /// Drop least recently used entries (never `keep`) until under the limit.
    fn evict_learned(&mut self, keep: &str) {
        let Some(limit) = self.learned_limit else {
            return;
        };
        while self.doc.learned_responses.len() > limit.max(1) {
            let oldest = self
                .doc
                .learned_responses
                .iter()
                .filter(|(k, _)| k.as_str() != keep)
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    self.doc.learned_responses.remove(&k);
                }
                None => break,
            }
        }
    }
}

fn read_document(path: &Path) -> Result<Option<ContextDocument>> {
    if !path.exists() {
        return Ok(None);
    }
    let txt = fs::read_to_string(path)?;
    if txt.trim().is_empty() {
        return Ok(None);
    }
    let doc: ContextDocument = serde_json::from_str(&txt)?;
    Ok(Some(doc))
}

/// Write to a sibling temp file, then rename over the target.
fn write_document(path: &Path, doc: &ContextDocument) -> Result<()> {
    let txt = serde_json::to_string_pretty(doc)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "context.json".to_string());
    let tmp = dir.join(format!(".{file_name}.{}.tmp", std::process::id()));

    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(txt.as_bytes())?;
        f.sync_all()?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn missing_file_loads_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContextStore::load(dir.path().join("memory.json"));
        assert_eq!(store.document(), &ContextDocument::default());
    }

    #[test]
    fn corrupt_file_loads_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        fs::write(&path, "{ not json").unwrap();
        let store = ContextStore::load(&path);
        assert!(store.document().user_data.is_empty());
        assert!(store.document().learned_responses.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");

        let mut store = ContextStore::load(&path);
        store.touch_user(&UserId::from("alice"), Some("Alice"), t0());
        store.touch_user(&UserId::from("alice"), None, t0() + Duration::seconds(5));
        store.learn("Purple carrots", t0());
        store
            .doc
            .conversations
            .insert("alice".to_string(), serde_json::json!({ "note": 1 }));
        store.save();
        store.save();

        let reloaded = ContextStore::load(&path);
        assert_eq!(reloaded.document(), store.document());
        let alice = reloaded.user(&UserId::from("alice")).unwrap();
        assert_eq!(alice.interaction_count, 2);
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.last_seen, t0() + Duration::seconds(5));
    }

    #[test]
    fn partial_records_keep_the_rest_of_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        fs::write(
            &path,
            r#"{"userData":{"alice":{"name":"Alice","interactionCount":7}},"conversations":{},"learnedResponses":{"purple carrots":{"count":5}}}"#,
        )
        .unwrap();

        let mut store = ContextStore::load(&path);
        let alice = store.user(&UserId::from("alice")).unwrap();
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.interaction_count, 7);
        assert_eq!(alice.last_seen, DateTime::<Utc>::default());
        assert_eq!(store.learned("Purple carrots").unwrap().count, 5);

        assert_eq!(store.learn("purple carrots", t0()), 6);
        store.save();
        let reloaded = ContextStore::load(&path);
        assert_eq!(reloaded.user(&UserId::from("alice")).unwrap().interaction_count, 7);
        assert_eq!(reloaded.learned("purple carrots").unwrap().last_used, t0());
    }

    #[test]
    fn file_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        let mut store = ContextStore::load(&path);
        store.touch_user(&UserId::from("bob"), None, t0());
        store.learn("x", t0());
        store.save();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["userData"]["bob"]["interactionCount"].is_u64());
        assert!(raw["userData"]["bob"]["lastSeen"].is_string());
        assert!(raw["conversations"].is_object());
        assert_eq!(raw["learnedResponses"]["x"]["count"], 1);
    }

    #[test]
    fn save_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContextStore::load(dir.path().join("missing-dir").join("memory.json"));
        store.save();
        assert!(!store.path().exists());
    }

    #[test]
    fn learn_keys_are_lowercased_and_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ContextStore::load(dir.path().join("memory.json"));
        let long = "É".repeat(80);
        assert_eq!(store.learn(&long, t0()), 1);
        assert_eq!(store.learn(&long.to_lowercase(), t0()), 2);

        let key = learned_key(&long);
        assert_eq!(key.chars().count(), LEARNED_KEY_CHARS);
        assert_eq!(store.document().learned_responses[&key].count, 2);
    }

    #[test]
    fn learned_limit_evicts_least_recently_used() {
        let dir = tempfile::tempdir().unwrap();
        let mut store =
            ContextStore::load(dir.path().join("memory.json")).with_learned_limit(Some(2));
        store.learn("a", t0());
        store.learn("b", t0() + Duration::seconds(1));
        store.learn("a", t0() + Duration::seconds(2));
        store.learn("c", t0() + Duration::seconds(3));

        let keys: Vec<_> = store.document().learned_responses.keys().cloned().collect();
        assert_eq!(keys, vec!["a".to_string(), "c".to_string()]);
    }
}
