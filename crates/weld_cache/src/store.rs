//! Content-addressed object store.
//!
//! Each entry lives at `<cache_dir>/<fingerprint-hex>.o` with a validated
//! binary header, so lookups are a single filename probe and no index file
//! exists to go stale. Stores write to a temporary file and rename, keeping
//! entries immutable from the moment they appear.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use weld_common::ContentHash;

use crate::error::CacheError;
use crate::policy::{CachePolicy, PruneStats};

/// Magic bytes identifying a Weld cache entry.
const ENTRY_MAGIC: [u8; 4] = *b"WOC\0";

/// Current entry format version. Increment on breaking changes to the
/// header or payload layout; old entries then read as misses.
const ENTRY_FORMAT_VERSION: u32 = 1;

/// File extension for cached native objects.
const ENTRY_EXT: &str = "o";

/// Header prepended to every cache entry for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryHeader {
    /// Magic bytes: must be `b"WOC\0"`.
    magic: [u8; 4],

    /// Entry format version.
    format_version: u32,

    /// Content hash of the payload (for corruption detection).
    checksum: ContentHash,
}

/// Incremental cache of generated native objects, keyed by task fingerprint.
///
/// Constructed either over a directory ([`ObjectCache::at_dir`]) or
/// disabled ([`ObjectCache::disabled`]); the disabled form always misses
/// and ignores stores, so callers never branch on whether caching is
/// configured. An I/O failure while storing degrades the cache to the
/// disabled behavior for the rest of the compile — caching is an
/// optimization, losing it is never an error.
///
/// Fingerprints touched by the current compile (stored or hit) are
/// remembered and exempt from [`prune`](Self::prune) until the next
/// compile's prune pass.
pub struct ObjectCache {
    dir: Option<PathBuf>,
    broken: AtomicBool,
    session: Mutex<HashSet<String>>,
}

impl ObjectCache {
    /// Creates a cache over the given directory.
    ///
    /// The directory is created on first store; it does not need to exist
    /// yet.
    pub fn at_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            broken: AtomicBool::new(false),
            session: Mutex::new(HashSet::new()),
        }
    }

    /// Creates a disabled cache: every lookup misses, stores and prunes are
    /// no-ops.
    pub fn disabled() -> Self {
        Self {
            dir: None,
            broken: AtomicBool::new(false),
            session: Mutex::new(HashSet::new()),
        }
    }

    /// Returns `true` if the cache is backed by a directory and has not
    /// degraded after an I/O failure.
    pub fn is_enabled(&self) -> bool {
        self.dir.is_some() && !self.broken.load(Ordering::Relaxed)
    }

    /// Returns the entry path for a fingerprint, if the cache is backed by
    /// a directory.
    fn entry_path(&self, fingerprint: &ContentHash) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|d| d.join(format!("{fingerprint}.{ENTRY_EXT}")))
    }

    fn mark_session(&self, fingerprint: &ContentHash) {
        let mut session = match self.session.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        session.insert(fingerprint.to_hex());
    }

    fn session_keys(&self) -> HashSet<String> {
        match self.session.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Looks up a fingerprint, returning the cached object bytes on a hit.
    ///
    /// Fail-safe: a missing file, unreadable file, corrupt header, stale
    /// format version, or checksum mismatch is a miss, never an error.
    pub fn lookup(&self, fingerprint: &ContentHash) -> Option<Vec<u8>> {
        if !self.is_enabled() {
            return None;
        }
        let path = self.entry_path(fingerprint)?;
        let raw = std::fs::read(&path).ok()?;
        let payload = decode_entry(&raw)?;
        self.mark_session(fingerprint);
        Some(payload)
    }

    /// Offers a generated object for storage under its fingerprint.
    ///
    /// Idempotent: if an identical entry already exists this is a no-op. An
    /// existing entry with *different* bytes returns
    /// [`CacheError::Conflict`] — the caller must treat that as fatal. I/O
    /// failures are not errors; they log a warning and degrade the cache to
    /// disabled behavior.
    pub fn store(&self, fingerprint: &ContentHash, bytes: &[u8]) -> Result<(), CacheError> {
        if !self.is_enabled() {
            return Ok(());
        }
        let path = match self.entry_path(fingerprint) {
            Some(p) => p,
            None => return Ok(()),
        };

        if let Ok(raw) = std::fs::read(&path) {
            if let Some(existing) = decode_entry(&raw) {
                if existing == bytes {
                    self.mark_session(fingerprint);
                    return Ok(());
                }
                return Err(CacheError::Conflict {
                    fingerprint: fingerprint.to_hex(),
                    path,
                });
            }
            // Undecodable leftover entry: fall through and replace it.
        }

        match self.write_entry(&path, fingerprint, bytes) {
            Ok(()) => {
                self.mark_session(fingerprint);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("disabling object cache: {err}");
                self.broken.store(true, Ordering::Relaxed);
                Ok(())
            }
        }
    }

    fn write_entry(
        &self,
        path: &Path,
        fingerprint: &ContentHash,
        bytes: &[u8],
    ) -> Result<(), CacheError> {
        let dir = match path.parent() {
            Some(d) => d,
            None => return Ok(()),
        };
        std::fs::create_dir_all(dir).map_err(|e| CacheError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let header = EntryHeader {
            magic: ENTRY_MAGIC,
            format_version: ENTRY_FORMAT_VERSION,
            checksum: ContentHash::from_bytes(bytes),
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| CacheError::Encoding {
                reason: e.to_string(),
            })?;

        // Layout: 4-byte header length (little-endian) + header + payload
        let mut output = Vec::with_capacity(4 + header_bytes.len() + bytes.len());
        output.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(bytes);

        // Write-then-rename keeps entries immutable once visible; two
        // processes racing on the same fingerprint write identical content,
        // so whichever rename lands last is indistinguishable.
        let tmp = dir.join(format!("{}.tmp.{}", fingerprint.to_hex(), std::process::id()));
        std::fs::write(&tmp, &output).map_err(|e| CacheError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Applies the pruning policy to the cache directory.
    ///
    /// Removes entries exceeding the age bound, then — oldest first —
    /// entries beyond the size bound. Entries stored or hit during this
    /// compile are never touched. Fail-safe like every other maintenance
    /// path: I/O problems log a warning and end the pass early.
    pub fn prune(&self, policy: &CachePolicy) -> PruneStats {
        let mut stats = PruneStats::default();
        let dir = match &self.dir {
            Some(d) if self.is_enabled() && !policy.is_unbounded() => d.clone(),
            _ => return stats,
        };

        let mut entries = match scan_entries(&dir) {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("skipping cache prune: {err}");
                return stats;
            }
        };
        let protected = self.session_keys();
        stats.retained = entries.len();

        // Oldest first, with the key as a tie-break so the pass is
        // deterministic when timestamps collide.
        entries.sort_by(|a, b| (a.modified, &a.key).cmp(&(b.modified, &b.key)));

        let now = SystemTime::now();
        let mut total: u64 = entries.iter().map(|e| e.size).sum();
        for entry in &entries {
            if protected.contains(&entry.key) {
                continue;
            }

            let too_old = policy.max_age.is_some_and(|max_age| {
                now.duration_since(entry.modified)
                    .map(|age| age > max_age.as_duration())
                    .unwrap_or(false)
            });
            let too_big = policy
                .max_size
                .is_some_and(|max_size| total > max_size.bytes());
            if !too_old && !too_big {
                continue;
            }

            match std::fs::remove_file(&entry.path) {
                Ok(()) => {
                    stats.removed += 1;
                    stats.reclaimed_bytes += entry.size;
                    stats.retained -= 1;
                    total -= entry.size;
                }
                Err(err) => {
                    tracing::warn!(
                        "failed to prune cache entry {}: {err}",
                        entry.path.display()
                    );
                }
            }
        }

        stats
    }
}

struct ScannedEntry {
    key: String,
    path: PathBuf,
    size: u64,
    modified: SystemTime,
}

fn scan_entries(dir: &Path) -> Result<Vec<ScannedEntry>, CacheError> {
    let mut entries = Vec::new();
    let read_dir = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        // A cache directory that was never created holds nothing to prune.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
        Err(e) => {
            return Err(CacheError::Io {
                path: dir.to_path_buf(),
                source: e,
            })
        }
    };

    for entry in read_dir {
        let entry = entry.map_err(|e| CacheError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXT) {
            continue;
        }
        let key = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => continue,
        };
        let meta = entry.metadata().map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e,
        })?;
        entries.push(ScannedEntry {
            key,
            size: meta.len(),
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            path,
        });
    }
    Ok(entries)
}

/// Decodes an entry file, returning the payload if every validation passes.
fn decode_entry(raw: &[u8]) -> Option<Vec<u8>> {
    if raw.len() < 4 {
        return None;
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&raw[..4]);
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    if raw.len() < 4 + header_len {
        return None;
    }

    let header: EntryHeader =
        bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
            .ok()?
            .0;
    if header.magic != ENTRY_MAGIC || header.format_version != ENTRY_FORMAT_VERSION {
        return None;
    }

    let payload = &raw[4 + header_len..];
    if ContentHash::from_bytes(payload) != header.checksum {
        return None;
    }
    Some(payload.to_vec())
}
