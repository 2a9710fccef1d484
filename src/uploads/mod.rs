//! Image uploads.
//!
//! Files land under `<static>/img/<category>/` and are referenced from the JSON
//! documents by their web path, `/static/img/<category>/<name>`.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

use axum::extract::multipart::Field;
use tempfile::NamedTempFile;

use crate::errors::AppError;
use crate::models::DEFAULT_MEMBER_IMAGE;

/// Maximum upload size (16 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Accepted image extensions, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Collision suffixes tried before falling back to a random one.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Destination directory of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadCategory {
    Poster,
    Members,
    Life,
}

impl UploadCategory {
    pub const ALL: [UploadCategory; 3] = [
        UploadCategory::Poster,
        UploadCategory::Members,
        UploadCategory::Life,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            UploadCategory::Poster => "poster",
            UploadCategory::Members => "members",
            UploadCategory::Life => "life",
        }
    }
}

impl fmt::Display for UploadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for UploadCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "poster" => Ok(UploadCategory::Poster),
            "members" => Ok(UploadCategory::Members),
            "life" => Ok(UploadCategory::Life),
            other => Err(AppError::validation(format!(
                "Unknown upload category '{}'. Expected poster, members or life",
                other
            ))),
        }
    }
}

/// Stores uploaded images under the static assets root.
#[derive(Debug, Clone)]
pub struct UploadStore {
    static_dir: PathBuf,
}

impl UploadStore {
    pub fn new(static_dir: impl Into<PathBuf>) -> Self {
        Self {
            static_dir: static_dir.into(),
        }
    }

    /// Create every category directory.
    pub fn init(&self) -> Result<(), AppError> {
        for category in UploadCategory::ALL {
            fs::create_dir_all(self.category_dir(category))?;
        }
        Ok(())
    }

    pub fn category_dir(&self, category: UploadCategory) -> PathBuf {
        self.static_dir.join("img").join(category.dir_name())
    }

    /// Validate the name and open a temp file in the destination directory.
    ///
    /// Nothing is created when the extension is rejected.
    pub fn begin(
        &self,
        original_name: &str,
        category: UploadCategory,
    ) -> Result<PendingUpload, AppError> {
        let (stem, extension) = split_name(original_name)?;
        let dir = self.category_dir(category);
        fs::create_dir_all(&dir)?;
        let file = NamedTempFile::new_in(&dir)?;

        Ok(PendingUpload {
            file,
            dir,
            stem,
            extension,
            category,
            written: 0,
        })
    }

    /// Stream a multipart file field into a new file and return its web path.
    pub async fn store(
        &self,
        mut field: Field<'_>,
        category: UploadCategory,
    ) -> Result<String, AppError> {
        let original_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::validation("No file selected"))?
            .to_string();

        let mut pending = self.begin(&original_name, category)?;
        while let Some(chunk) = field.chunk().await? {
            pending.write_chunk(&chunk)?;
        }
        pending.finish()
    }

    /// Delete a previously stored upload referenced by `web_path`.
    ///
    /// Only files inside the category directories are touched; the shared
    /// default member image is never removed.
    pub fn remove(&self, web_path: &str) {
        let Some(path) = self.resolve(web_path) else {
            return;
        };
        match fs::remove_file(&path) {
            Ok(()) => tracing::info!(file = %path.display(), "Removed uploaded image"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(file = %path.display(), error = %e, "Failed to remove image"),
        }
    }

    fn resolve(&self, web_path: &str) -> Option<PathBuf> {
        if web_path == DEFAULT_MEMBER_IMAGE {
            return None;
        }
        let rest = web_path.strip_prefix("/static/img/")?;
        let (category, file_name) = rest.split_once('/')?;
        let category = category.parse::<UploadCategory>().ok()?;
        let safe = !file_name.is_empty()
            && !file_name.contains('/')
            && !file_name.contains('\\')
            && file_name != ".."
            && !file_name.starts_with('.');
        safe.then(|| self.category_dir(category).join(file_name))
    }
}

/// An upload in progress. Dropping it without `finish` deletes the temp file.
pub struct PendingUpload {
    file: NamedTempFile,
    dir: PathBuf,
    stem: String,
    extension: String,
    category: UploadCategory,
    written: u64,
}

impl PendingUpload {
    /// Append a chunk, failing once the running total passes the size limit.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), AppError> {
        self.written += chunk.len() as u64;
        if self.written > MAX_UPLOAD_BYTES {
            return Err(AppError::TooLarge {
                limit: MAX_UPLOAD_BYTES,
            });
        }
        self.file.write_all(chunk)?;
        Ok(())
    }

    /// Move the temp file to a free name and return its web path.
    pub fn finish(self) -> Result<String, AppError> {
        if self.written == 0 {
            return Err(AppError::validation("Empty file provided"));
        }
        self.file.as_file().sync_all()?;

        let PendingUpload {
            mut file,
            dir,
            stem,
            extension,
            category,
            written,
        } = self;
        let stored = |name: &str| {
            tracing::info!(category = %category, file = name, bytes = written, "Stored upload");
            format!("/static/img/{}/{}", category, name)
        };

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = candidate_name(&stem, &extension, attempt);
            match file.persist_noclobber(dir.join(&name)) {
                Ok(_) => return Ok(stored(&name)),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => file = e.file,
                Err(e) => return Err(e.error.into()),
            }
        }

        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let name = format!("{}-{}.{}", stem, &suffix[..8], extension);
        file.persist_noclobber(dir.join(&name))
            .map_err(|e| AppError::from(e.error))?;
        Ok(stored(&name))
    }

    #[cfg(test)]
    fn temp_path(&self) -> &std::path::Path {
        self.file.path()
    }
}

fn candidate_name(stem: &str, extension: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{}.{}", stem, extension)
    } else {
        format!("{}-{}.{}", stem, attempt, extension)
    }
}

/// Split an uploaded file name into a safe stem and a lower-case, allowed extension.
fn split_name(original_name: &str) -> Result<(String, String), AppError> {
    // Browsers on some platforms send the full client path.
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    let (raw_stem, raw_ext) = base
        .rsplit_once('.')
        .ok_or_else(|| AppError::UnsupportedType(format!("File '{}' has no extension", base)))?;

    let extension = raw_ext.to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        tracing::warn!(file = base, "Rejected upload with unsupported extension");
        return Err(AppError::UnsupportedType(format!(
            "Unsupported file type '{}'. Allowed: {}",
            extension,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    Ok((sanitize_stem(raw_stem), extension))
}

/// Keep ASCII letters, digits, `-`, `_` and `.`; whitespace becomes `_`.
pub fn sanitize_stem(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}
