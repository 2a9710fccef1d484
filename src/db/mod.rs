//! JSON document store.
//!
//! One file per collection or singleton under the data directory. The files are
//! the source of truth; every read goes to disk.

mod repository;

pub use repository::*;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::errors::AppError;
use crate::models::{ClubInfo, ContactInfo, Defaulted, Record};

/// Top-level JSON shape a document must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Object,
    Array,
}

/// The documents kept in the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    ClubInfo,
    ContactInfo,
    Events,
    Members,
    Gallery,
}

impl Document {
    pub const ALL: [Document; 5] = [
        Document::ClubInfo,
        Document::ContactInfo,
        Document::Events,
        Document::Members,
        Document::Gallery,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Document::ClubInfo => "club_info.json",
            Document::ContactInfo => "contact_info.json",
            Document::Events => "events.json",
            Document::Members => "members.json",
            Document::Gallery => "gallery.json",
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Document::ClubInfo | Document::ContactInfo => Shape::Object,
            Document::Events | Document::Members | Document::Gallery => Shape::Array,
        }
    }

    fn default_contents(&self) -> Result<Value, serde_json::Error> {
        match self {
            Document::ClubInfo => serde_json::to_value(ClubInfo::default()),
            Document::ContactInfo => serde_json::to_value(ContactInfo::default()),
            Document::Events | Document::Members | Document::Gallery => Ok(Value::Array(vec![])),
        }
    }
}

/// Contents of a document.
///
/// Keys missing from the file are remembered on load and left out again on
/// save while they still hold their default.
pub trait Stored: Serialize + DeserializeOwned {
    fn remember_defaults(&mut self, raw: &Value) -> Result<(), serde_json::Error>;
    fn strip_defaults(&self, value: &mut Value);
}

impl<R: Record + DeserializeOwned> Stored for Vec<R> {
    fn remember_defaults(&mut self, raw: &Value) -> Result<(), serde_json::Error> {
        if let Value::Array(items) = raw {
            for (record, item) in self.iter_mut().zip(items) {
                remember(record, item)?;
            }
        }
        Ok(())
    }

    fn strip_defaults(&self, value: &mut Value) {
        if let Value::Array(items) = value {
            for (record, item) in self.iter().zip(items.iter_mut()) {
                record.defaulted().strip(item);
            }
        }
    }
}

impl Stored for ClubInfo {
    fn remember_defaults(&mut self, raw: &Value) -> Result<(), serde_json::Error> {
        remember(self, raw)
    }

    fn strip_defaults(&self, value: &mut Value) {
        self.defaulted.strip(value);
    }
}

impl Stored for ContactInfo {
    fn remember_defaults(&mut self, raw: &Value) -> Result<(), serde_json::Error> {
        remember(self, raw)
    }

    fn strip_defaults(&self, value: &mut Value) {
        self.defaulted.strip(value);
    }
}

fn remember<R: Record>(record: &mut R, raw: &Value) -> Result<(), serde_json::Error> {
    let filled = serde_json::to_value(&*record)?;
    *record.defaulted_mut() = Defaulted::between(raw, &filled);
    Ok(())
}

/// Reads and atomically rewrites the JSON documents.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_of(&self, doc: Document) -> PathBuf {
        self.data_dir.join(doc.file_name())
    }

    /// Create the data directory and seed any missing document with its default.
    ///
    /// Runs once at startup. Existing files are never touched.
    pub fn init(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.data_dir)?;

        for doc in Document::ALL {
            let path = self.path_of(doc);
            if path.exists() {
                continue;
            }
            let contents = doc
                .default_contents()
                .map_err(|e| AppError::Internal(format!("Failed to build default: {}", e)))?;
            self.write_atomic(&path, &contents)?;
            tracing::info!(file = %path.display(), "Seeded missing data file");
        }

        Ok(())
    }

    /// Load a document and decode it into `T`.
    ///
    /// A missing file, invalid JSON or the wrong top-level shape is `StoreCorrupt`.
    pub fn load<T: Stored>(&self, doc: Document) -> Result<T, AppError> {
        let path = self.path_of(doc);
        let raw = fs::read(&path).map_err(|e| corrupt(&path, format!("cannot be read: {}", e)))?;
        let value: Value = serde_json::from_slice(&raw)
            .map_err(|e| corrupt(&path, format!("is not valid JSON: {}", e)))?;

        let value = match (doc.shape(), value) {
            (Shape::Object, value @ Value::Object(_)) => value,
            (Shape::Array, value @ Value::Array(_)) => value,
            (Shape::Array, Value::Object(mut legacy)) if doc == Document::Events => {
                // {"next_id": n, "events": [...]} from older deployments
                match legacy.remove("events") {
                    Some(events @ Value::Array(_)) => events,
                    _ => return Err(corrupt(&path, "has no events array".to_string())),
                }
            }
            (Shape::Object, _) => {
                return Err(corrupt(&path, "must hold a JSON object".to_string()))
            }
            (Shape::Array, _) => return Err(corrupt(&path, "must hold a JSON array".to_string())),
        };

        let mut contents: T = serde_json::from_value(value.clone())
            .map_err(|e| corrupt(&path, format!("has bad fields: {}", e)))?;
        contents.remember_defaults(&value).map_err(|e| {
            AppError::Internal(format!("Failed to re-serialize {}: {}", doc.file_name(), e))
        })?;
        Ok(contents)
    }

    /// Serialize `value` and replace the document in one rename.
    pub fn save<T: Stored>(&self, doc: Document, value: &T) -> Result<(), AppError> {
        let mut contents = serde_json::to_value(value).map_err(|e| {
            AppError::Internal(format!("Failed to serialize {}: {}", doc.file_name(), e))
        })?;
        value.strip_defaults(&mut contents);

        let shape_ok = match doc.shape() {
            Shape::Object => contents.is_object(),
            Shape::Array => contents.is_array(),
        };
        if !shape_ok {
            return Err(AppError::Internal(format!(
                "Refusing to write {} with the wrong top-level shape",
                doc.file_name()
            )));
        }

        self.write_atomic(&self.path_of(doc), &contents)
    }

    fn write_atomic(&self, path: &Path, contents: &Value) -> Result<(), AppError> {
        let bytes = serde_json::to_vec_pretty(contents)
            .map_err(|e| AppError::Internal(format!("Failed to serialize: {}", e)))?;

        // Temp file lives in the same directory so the rename stays on one filesystem.
        // Dropping it on an error path removes it.
        let mut tmp = NamedTempFile::new_in(&self.data_dir)?;
        tmp.write_all(&bytes)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| AppError::from(e.error))?;

        tracing::debug!(file = %path.display(), bytes = bytes.len(), "Wrote data file");
        Ok(())
    }
}

fn corrupt(path: &Path, reason: String) -> AppError {
    let message = format!("Data file {} {}", path.display(), reason);
    tracing::error!("{}", message);
    AppError::StoreCorrupt(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, GalleryItem, Member};
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("data"));
        store.init().unwrap();
        (dir, store)
    }

    #[test]
    fn test_init_seeds_every_document() {
        let (_dir, store) = store();

        for doc in Document::ALL {
            assert!(store.path_of(doc).exists(), "{} missing", doc.file_name());
        }
        let events: Vec<Event> = store.load(Document::Events).unwrap();
        assert!(events.is_empty());
        let club: ClubInfo = store.load(Document::ClubInfo).unwrap();
        assert_eq!(club, ClubInfo::default());
    }

    #[test]
    fn test_init_keeps_existing_files() {
        let (_dir, store) = store();
        fs::write(store.path_of(Document::Members), r#"[{"name":"Ada"}]"#).unwrap();

        store.init().unwrap();

        let members: Vec<Member> = store.load(Document::Members).unwrap();
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn test_missing_file_is_store_corrupt() {
        let (_dir, store) = store();
        fs::remove_file(store.path_of(Document::Gallery)).unwrap();

        let result: Result<Vec<GalleryItem>, _> = store.load(Document::Gallery);
        assert!(matches!(result, Err(AppError::StoreCorrupt(_))));
    }

    #[test]
    fn test_malformed_file_is_store_corrupt() {
        let (_dir, store) = store();
        fs::write(store.path_of(Document::Members), "[{\"name\": ").unwrap();

        let result: Result<Vec<Member>, _> = store.load(Document::Members);
        assert!(matches!(result, Err(AppError::StoreCorrupt(_))));
    }

    #[test]
    fn test_wrong_shape_is_store_corrupt() {
        let (_dir, store) = store();
        fs::write(store.path_of(Document::ContactInfo), "[]").unwrap();
        fs::write(store.path_of(Document::Members), "{}").unwrap();

        let contact: Result<ContactInfo, _> = store.load(Document::ContactInfo);
        let members: Result<Vec<Member>, _> = store.load(Document::Members);
        assert!(matches!(contact, Err(AppError::StoreCorrupt(_))));
        assert!(matches!(members, Err(AppError::StoreCorrupt(_))));
    }

    #[test]
    fn test_legacy_events_object_is_accepted() {
        let (_dir, store) = store();
        fs::write(
            store.path_of(Document::Events),
            json!({"next_id": 8, "events": [{"id": 7, "name": "Old"}]}).to_string(),
        )
        .unwrap();

        let events: Vec<Event> = store.load(Document::Events).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, 7);

        store.save(Document::Events, &events).unwrap();
        let raw: Value =
            serde_json::from_slice(&fs::read(store.path_of(Document::Events)).unwrap()).unwrap();
        assert!(raw.is_array());
    }

    #[test]
    fn test_save_load_round_trip_preserves_structure() {
        let (_dir, store) = store();
        let docs = [
            (
                Document::Events,
                json!([{
                    "id": 3, "name": "Hack Day", "date": "2026-05-01", "time": "10:00",
                    "location": "Lab 1", "description": "Build things", "how": "Teams of 3",
                    "rules": ["Be nice", "Ship"],
                    "coordinators": [{"name": "Ada", "role": "Lead", "phone": "1", "email": "a@x"}],
                    "status": "ongoing", "image": "/static/img/poster/hack.png",
                    "register_link": "https://reg",
                    "registration_deadline": {"date": "2026-04-20", "message": "Hurry"},
                    "show_in_events": false, "registration_type": "external"
                }]),
            ),
            (
                Document::Members,
                json!([{
                    "name": "Ada", "role": "Lead", "year": "IV", "domain": "ML",
                    "image": "/static/img/members/ada.png", "linkedin": "l", "github": "g"
                }]),
            ),
            (
                Document::Gallery,
                json!([{
                    "title": "Demo", "description": "d", "image": "/static/img/life/a.png",
                    "category": "workshop", "url": "/static/uploads/a.png"
                }]),
            ),
            (
                Document::ClubInfo,
                json!({
                    "name": "AI Club", "short_name": "AIC", "tagline": "t", "description": "d",
                    "college": "c", "department": "dep", "address": "a", "logo": "/static/img/l.webp",
                    "member_roles": ["President", "Member"]
                }),
            ),
            (
                Document::ContactInfo,
                json!({
                    "email": "club@x", "linkedin": "", "instagram": "i", "facebook": "f",
                    "faculty_coordinators": [{"name": "Dr. B", "phone": "2"}],
                    "secretaries": []
                }),
            ),
        ];

        for (doc, contents) in docs {
            fs::write(store.path_of(doc), contents.to_string()).unwrap();
            let reloaded = match doc {
                Document::Events => {
                    let v: Vec<Event> = store.load(doc).unwrap();
                    store.save(doc, &v).unwrap();
                    let v: Vec<Event> = store.load(doc).unwrap();
                    serde_json::to_value(v).unwrap()
                }
                Document::Members => {
                    let v: Vec<Member> = store.load(doc).unwrap();
                    store.save(doc, &v).unwrap();
                    serde_json::to_value(store.load::<Vec<Member>>(doc).unwrap()).unwrap()
                }
                Document::Gallery => {
                    let v: Vec<GalleryItem> = store.load(doc).unwrap();
                    store.save(doc, &v).unwrap();
                    serde_json::to_value(store.load::<Vec<GalleryItem>>(doc).unwrap()).unwrap()
                }
                Document::ClubInfo => {
                    let v: ClubInfo = store.load(doc).unwrap();
                    store.save(doc, &v).unwrap();
                    serde_json::to_value(store.load::<ClubInfo>(doc).unwrap()).unwrap()
                }
                Document::ContactInfo => {
                    let v: ContactInfo = store.load(doc).unwrap();
                    store.save(doc, &v).unwrap();
                    serde_json::to_value(store.load::<ContactInfo>(doc).unwrap()).unwrap()
                }
            };
            assert_eq!(reloaded, contents, "{} changed on round trip", doc.file_name());
        }
    }

    fn raw_file(store: &JsonStore, doc: Document) -> Value {
        serde_json::from_slice(&fs::read(store.path_of(doc)).unwrap()).unwrap()
    }

    #[test]
    fn test_sparse_documents_round_trip_unchanged() {
        let (_dir, store) = store();
        let docs = [
            (
                Document::Events,
                json!([{"id": 1, "name": "A", "registration_deadline": null}]),
            ),
            (
                Document::Members,
                json!([{"name": "Ada"}, {"name": "Bo", "role": ""}]),
            ),
            (Document::Gallery, json!([{"title": "Demo"}])),
            (Document::ClubInfo, json!({"name": "AI Club"})),
            (
                Document::ContactInfo,
                json!({"email": "club@x", "secretaries": [{"name": "Cy"}]}),
            ),
        ];

        for (doc, contents) in docs {
            fs::write(store.path_of(doc), contents.to_string()).unwrap();
            match doc {
                Document::Events => {
                    let v: Vec<Event> = store.load(doc).unwrap();
                    store.save(doc, &v).unwrap();
                }
                Document::Members => {
                    let v: Vec<Member> = store.load(doc).unwrap();
                    store.save(doc, &v).unwrap();
                }
                Document::Gallery => {
                    let v: Vec<GalleryItem> = store.load(doc).unwrap();
                    store.save(doc, &v).unwrap();
                }
                Document::ClubInfo => {
                    let v: ClubInfo = store.load(doc).unwrap();
                    store.save(doc, &v).unwrap();
                }
                Document::ContactInfo => {
                    let v: ContactInfo = store.load(doc).unwrap();
                    store.save(doc, &v).unwrap();
                }
            }
            assert_eq!(
                raw_file(&store, doc),
                contents,
                "{} changed on round trip",
                doc.file_name()
            );
        }
    }

    #[test]
    fn test_edited_sparse_record_only_gains_edited_keys() {
        let (_dir, store) = store();
        fs::write(
            store.path_of(Document::Members),
            json!([{"name": "Ada"}, {"name": "Bo"}]).to_string(),
        )
        .unwrap();

        let mut members: Vec<Member> = store.load(Document::Members).unwrap();
        members[1].role = "Lead".to_string();
        members.remove(0);
        store.save(Document::Members, &members).unwrap();

        assert_eq!(
            raw_file(&store, Document::Members),
            json!([{"name": "Bo", "role": "Lead"}])
        );
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let (_dir, store) = store();
        let members: Vec<Member> = store.load(Document::Members).unwrap();
        store.save(Document::Members, &members).unwrap();

        let names: Vec<String> = fs::read_dir(store.data_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), Document::ALL.len(), "unexpected files: {:?}", names);
    }
}
