//! A process-local cache of detection results keyed by the raw bytes of the source file, so
//! re-opening the same file without modification skips re-segmenting and re-naming its chords.

use log::debug;
use std::collections::HashMap;

use crate::chord::Chord;

/// 64-bit FNV-1a of `bytes`, formatted as lowercase hex.
///
/// FNV-1a is used (rather than pulling in a hashing crate) purely as a cheap content fingerprint;
/// it is not used anywhere security-sensitive.
fn fingerprint(bytes: &[u8]) -> String {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET_BASIS;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    format!("{:016x}", hash)
}

/// A cache of labelled chord lists keyed by file content fingerprint.
#[derive(Clone, Debug, Default)]
pub struct DetectionCache {
    entries: HashMap<String, Vec<Chord>>,
}

impl DetectionCache {
    /// A new, empty cache.
    pub fn new() -> Self {
        DetectionCache {
            entries: HashMap::new(),
        }
    }

    /// Look up the chords previously stored for `bytes`, if any.
    pub fn get(&self, bytes: &[u8]) -> Option<Vec<Chord>> {
        let key = fingerprint(bytes);
        match self.entries.get(&key) {
            Some(chords) => {
                debug!("detection cache hit for {}", key);
                Some(chords.clone())
            }
            None => {
                debug!("detection cache miss for {}", key);
                None
            }
        }
    }

    /// Store `chords` against the fingerprint of `bytes`, replacing any prior entry.
    pub fn put(&mut self, bytes: &[u8], chords: Vec<Chord>) {
        let key = fingerprint(bytes);
        self.entries.insert(key, chords);
    }

    /// Discard every cached entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The number of distinct files currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(pitches: &[u8]) -> Chord {
        Chord::synthetic(pitches.to_vec(), 0, 480)
    }

    #[test]
    fn miss_then_hit_after_put() {
        let mut cache = DetectionCache::new();
        let bytes = b"pretend midi bytes";
        assert!(cache.get(bytes).is_none());

        cache.put(bytes, vec![chord(&[60, 64, 67])]);
        let hit = cache.get(bytes).expect("expected a cache hit");
        assert_eq!(1, hit.len());
    }

    #[test]
    fn distinct_bytes_get_distinct_entries() {
        let mut cache = DetectionCache::new();
        cache.put(b"file a", vec![chord(&[60, 64, 67])]);
        cache.put(b"file b", vec![chord(&[62, 65, 69])]);
        assert_eq!(2, cache.len());
    }

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(fingerprint(b"abc"), fingerprint(b"abc"));
        assert_ne!(fingerprint(b"abc"), fingerprint(b"abd"));
    }
}
