//! Flat-file JSON store: one document per manga, keyed by slugified title,
//! plus a list of every title seen so far.

use crate::models::{slugify, Manga};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const TITLE_LIST_DIR: &str = "list_titles";
const TITLE_LIST_FILE: &str = "list_titles.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Open a store rooted at `root`, creating its directories if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let list_dir = root.join(TITLE_LIST_DIR);
        fs::create_dir_all(&list_dir).map_err(|source| StoreError::Io { path: list_dir, source })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document for `title`. Path separators in the slug
    /// become hyphens so every document sits directly under the root.
    pub fn path_for(&self, title: &str) -> PathBuf {
        let file_stem = slugify(title).replace(['/', '\\'], "-");
        self.root.join(format!("{}.json", file_stem))
    }

    /// Write the manga's document, replacing any previous one for the title
    pub fn put(&self, manga: &Manga) -> Result<PathBuf, StoreError> {
        let path = self.path_for(&manga.title);
        write_json(&path, manga)?;
        log::info!("Saved {} to {}", manga.title, path.display());
        Ok(path)
    }

    pub fn get(&self, title: &str) -> Result<Option<Manga>, StoreError> {
        let path = self.path_for(title);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::Json { path, source })
    }

    pub fn contains(&self, title: &str) -> bool {
        self.path_for(title).is_file()
    }

    fn title_list_path(&self) -> PathBuf {
        self.root.join(TITLE_LIST_DIR).join(TITLE_LIST_FILE)
    }

    pub fn title_list(&self) -> Result<Vec<String>, StoreError> {
        let path = self.title_list_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&content).map_err(|source| StoreError::Json { path, source })
    }

    /// Replace the title list
    pub fn save_title_list(&self, titles: &[String]) -> Result<(), StoreError> {
        write_json(&self.title_list_path(), &titles)
    }

    /// Append the titles not already listed, keeping the existing order.
    /// Returns how many were added.
    pub fn merge_title_list(&self, titles: &[String]) -> Result<usize, StoreError> {
        let mut list = self.title_list()?;
        let before = list.len();
        for title in titles {
            if !list.contains(title) {
                list.push(title.clone());
            }
        }
        self.save_title_list(&list)?;
        Ok(list.len() - before)
    }
}

/// Pretty JSON with 4-space indentation; non-ASCII text is written as-is
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = to_json(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
