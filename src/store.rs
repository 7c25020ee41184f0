//! Named banner persistence.
//!
//! Banners are kept in a single JSON file so they can be listed, re-edited
//! and rendered again later:
//!
//! ```json
//! {
//!   "nextId": 3,
//!   "banners": [
//!     { "id": 1, "name": "digest", "logo": "assets/logos/badge.png",
//!       "image": "https://example.com/photo.jpg", "text": "Hello", "background": true }
//!   ]
//! }
//! ```
//!
//! Every mutation rewrites the file through a temporary sibling and a rename.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{BannerError, BannerResult};
use crate::request::BannerRequest;

/// A stored banner. Names are unique within a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerRecord {
    pub id: u64,
    pub name: String,
    pub logo: String,
    pub image: String,
    pub text: String,
    pub background: bool,
}

impl BannerRecord {
    /// The record as a request, ready to pre-fill an edit form or re-render.
    pub fn to_request(&self) -> BannerRequest {
        BannerRequest {
            name: Some(self.name.clone()),
            logo: self.logo.clone(),
            image: self.image.clone(),
            text: self.text.clone(),
            background: self.background,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    #[serde(default = "first_id")]
    next_id: u64,
    #[serde(default)]
    banners: Vec<BannerRecord>,
}

fn first_id() -> u64 {
    1
}

#[derive(Debug)]
pub struct BannerStore {
    path: PathBuf,
    data: StoreFile,
}

impl BannerStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> BannerResult<Self> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| BannerError::store(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreFile {
                next_id: first_id(),
                banners: Vec::new(),
            },
            Err(e) => return Err(BannerError::io(&path, e)),
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.data.banners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.banners.is_empty()
    }

    /// Inserts a named request, or replaces the fields of the record that
    /// already has its name (keeping that record's id).
    pub fn upsert(&mut self, request: &BannerRequest) -> BannerResult<BannerRecord> {
        let name = request
            .name
            .as_deref()
            .map(normalize_name)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| BannerError::invalid_request("a banner needs a name to be saved"))?;

        let record = match self.data.banners.iter_mut().find(|r| r.name == name) {
            Some(existing) => {
                existing.logo = request.logo.clone();
                existing.image = request.image.clone();
                existing.text = request.text.clone();
                existing.background = request.background;
                existing.clone()
            }
            None => {
                let record = BannerRecord {
                    id: self.data.next_id,
                    name: name.to_string(),
                    logo: request.logo.clone(),
                    image: request.image.clone(),
                    text: request.text.clone(),
                    background: request.background,
                };
                self.data.next_id += 1;
                self.data.banners.push(record.clone());
                record
            }
        };

        self.flush()?;
        info!(id = record.id, name = %record.name, "stored banner");
        Ok(record)
    }

    pub fn get(&self, name: &str) -> Option<&BannerRecord> {
        let name = normalize_name(name);
        self.data.banners.iter().find(|r| r.name == name)
    }

    pub fn get_by_id(&self, id: u64) -> Option<&BannerRecord> {
        self.data.banners.iter().find(|r| r.id == id)
    }

    /// All records, ordered by id.
    pub fn list(&self) -> Vec<&BannerRecord> {
        let mut records: Vec<_> = self.data.banners.iter().collect();
        records.sort_by_key(|r| r.id);
        records
    }

    /// Removes the record named `name`, returning it if it existed.
    pub fn remove(&mut self, name: &str) -> BannerResult<Option<BannerRecord>> {
        let name = normalize_name(name);
        let Some(index) = self.data.banners.iter().position(|r| r.name == name) else {
            return Ok(None);
        };
        let removed = self.data.banners.remove(index);
        self.flush()?;
        info!(id = removed.id, name = %removed.name, "removed banner");
        Ok(Some(removed))
    }

    fn flush(&self) -> BannerResult<()> {
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| BannerError::store(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| BannerError::io(parent, e))?;
        }
        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);

        fs::write(&tmp, json).map_err(|e| BannerError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| BannerError::io(&self.path, e))?;
        Ok(())
    }
}

/// Names are stored and looked up without surrounding whitespace.
fn normalize_name(name: &str) -> &str {
    name.trim()
}
