// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File-backed tag storage.
//
// Every mutation is a full load-modify-rewrite of the backing file. There is
// no locking: one writer per file is assumed, and concurrent writers from
// separate instances or processes may lose each other's updates.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use scanwerk_core::error::TagRetrievalError;
use tracing::{debug, info, instrument};

use crate::codec::{decode_tags, encode_tags};

/// A durable set of tag strings.
pub trait TagStorage {
    /// All stored tags. An absent store is an empty set.
    fn available_tags(&self) -> Result<BTreeSet<String>, TagRetrievalError>;

    /// Add `tag`. Adding a tag that is already present changes nothing.
    fn add_tag(&self, tag: &str) -> Result<(), TagRetrievalError>;

    /// Remove `tag`. Removing an absent tag changes nothing and succeeds.
    fn remove_tag(&self, tag: &str) -> Result<(), TagRetrievalError>;
}

/// Tag store kept in a single file of length-prefixed UTF-8 records.
#[derive(Debug, Clone)]
pub struct FileTagStore {
    path: PathBuf,
}

impl FileTagStore {
    /// Create a store backed by `path`. Nothing is touched on disk until the
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> TagRetrievalError {
        TagRetrievalError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Overwrite the backing file with `tags`, creating it and its parent
    /// directory if needed.
    #[instrument(skip_all, fields(path = %self.path.display(), count = tags.len()))]
    fn store_tags(&self, tags: &BTreeSet<String>) -> Result<(), TagRetrievalError> {
        let bytes = encode_tags(tags)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, &bytes).map_err(|e| self.io_error(e))?;

        debug!(bytes = bytes.len(), "tag file written");
        Ok(())
    }
}

impl TagStorage for FileTagStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn available_tags(&self) -> Result<BTreeSet<String>, TagRetrievalError> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("tag file absent, treating as empty");
                return Ok(BTreeSet::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let tags = decode_tags(&data)?;
        debug!(count = tags.len(), "tags loaded");
        Ok(tags)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn add_tag(&self, tag: &str) -> Result<(), TagRetrievalError> {
        let mut tags = self.available_tags()?;
        if !tags.insert(tag.to_owned()) {
            debug!("tag already present");
        }
        self.store_tags(&tags)?;
        info!(tag, "tag added");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn remove_tag(&self, tag: &str) -> Result<(), TagRetrievalError> {
        let mut tags = self.available_tags()?;
        if !tags.remove(tag) {
            debug!("tag not present");
        }
        self.store_tags(&tags)?;
        info!(tag, "tag removed");
        Ok(())
    }
}
