//! MIDI container signature check.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{MidiError, MidiResult};

/// The four bytes every standard MIDI file starts with.
pub const MIDI_SIGNATURE: &[u8; 4] = b"MThd";

/// Returns true if `bytes` starts with the MIDI signature.
pub fn has_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(MIDI_SIGNATURE)
}

/// Fails with [`MidiError::InvalidSignature`] unless `bytes` starts with `MThd`.
pub fn check_signature(bytes: &[u8]) -> MidiResult<()> {
    if has_signature(bytes) {
        Ok(())
    } else {
        Err(MidiError::InvalidSignature {
            found: bytes.iter().take(MIDI_SIGNATURE.len()).copied().collect(),
        })
    }
}

/// Validates that the file at `path` is a MIDI container.
///
/// Reads at most the first four bytes; nothing after the signature is examined.
/// A file shorter than four bytes is rejected like any other mismatch.
pub fn validate(path: &Path) -> MidiResult<()> {
    let file = File::open(path).map_err(|e| MidiError::read(path, e))?;
    let mut head = Vec::with_capacity(MIDI_SIGNATURE.len());
    file.take(MIDI_SIGNATURE.len() as u64)
        .read_to_end(&mut head)
        .map_err(|e| MidiError::read(path, e))?;
    check_signature(&head)
}
