//! Clipboard change detection
//!
//! Content fingerprinting plus a single-slot "last seen" detector.
//! The detector records every observed snapshot, whether or not it ends up
//! stored, so content that is filtered out is not re-examined on every poll.

use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// SHA-256 digest of clipboard content. Used for equality only.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Lowercase hex form, as stored in the database
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 8 bytes are plenty to tell fingerprints apart in logs
        write!(f, "Fingerprint({}..)", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Fingerprint(bytes))
    }
}

/// Compute the fingerprint of clipboard content.
pub fn fingerprint(content: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Fingerprint(hasher.finalize().into())
}

/// Pure comparison against the last seen fingerprint.
///
/// Nothing seen yet counts as a change.
pub fn has_changed(current: &Fingerprint, last_seen: Option<&Fingerprint>) -> bool {
    last_seen != Some(current)
}

/// Clipboard change detector holding exactly one "last seen" fingerprint.
#[derive(Debug, Default)]
pub struct ClipboardChangeDetector {
    last_seen: Option<Fingerprint>,
}

impl ClipboardChangeDetector {
    pub fn new() -> Self {
        Self { last_seen: None }
    }

    /// Record `current` as the latest snapshot and report whether it differs
    /// from the previous one.
    ///
    /// The slot is overwritten unconditionally.
    pub fn observe(&mut self, current: Fingerprint) -> bool {
        let changed = has_changed(&current, self.last_seen.as_ref());

        if changed {
            debug!(
                old = ?self.last_seen,
                new = ?current,
                "Clipboard change detected via fingerprint"
            );
        }

        self.last_seen = Some(current);
        changed
    }

    /// Establish a baseline without reporting a change.
    ///
    /// Used at monitor start so whatever is already on the clipboard is not
    /// captured as a new entry.
    pub fn prime(&mut self, baseline: Fingerprint) {
        self.last_seen = Some(baseline);
    }

    /// Reset the detector state.
    ///
    /// Next call to `observe()` will return true.
    pub fn reset(&mut self) {
        self.last_seen = None;
    }

    pub fn last_seen(&self) -> Option<&Fingerprint> {
        self.last_seen.as_ref()
    }
}
