//! Voice entries, voice groups, and the voicegroup index.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Synthesis method of a voice, derived from its macro name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceKind {
    /// Direct sample playback (`voice_directsound*`).
    Direct,
    /// Square wave channel (`voice_square_1`, `voice_square_2`, ...).
    Square,
    /// Programmable wave channel.
    Wave,
    /// Noise channel.
    Noise,
    /// Drum set macro pointing at another group.
    DrumSet,
    /// Key-split macro pointing at another group.
    #[serde(rename = "keysplits")]
    KeySplit,
    /// Anything not matched by the rules above.
    Unknown,
}

/// Ordered classification rules; the first matching substring wins.
const KIND_RULES: &[(&str, VoiceKind)] = &[
    ("keysplit", VoiceKind::KeySplit),
    ("drum", VoiceKind::DrumSet),
    ("directsound", VoiceKind::Direct),
    ("wave", VoiceKind::Wave),
    ("square", VoiceKind::Square),
    ("noise", VoiceKind::Noise),
];

impl VoiceKind {
    /// Classifies a macro name by case-insensitive substring rules.
    ///
    /// Unrecognized macros classify as [`VoiceKind::Unknown`]; this never fails.
    pub fn classify(macro_name: &str) -> Self {
        let lowered = macro_name.to_ascii_lowercase();
        KIND_RULES
            .iter()
            .find(|(needle, _)| lowered.contains(needle))
            .map(|(_, kind)| *kind)
            .unwrap_or(VoiceKind::Unknown)
    }

    /// Returns the lowercase name used in the JSON index.
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceKind::Direct => "direct",
            VoiceKind::Square => "square",
            VoiceKind::Wave => "wave",
            VoiceKind::Noise => "noise",
            VoiceKind::DrumSet => "drumset",
            VoiceKind::KeySplit => "keysplits",
            VoiceKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One numbered slot in a voice group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceEntry {
    /// Zero-based slot; the value a program change must carry to select this voice.
    pub index: usize,
    /// Macro name, e.g. `voice_directsound`.
    #[serde(rename = "macro")]
    pub macro_name: String,
    /// Raw argument text following the macro.
    pub args: String,
    #[serde(rename = "type")]
    pub kind: VoiceKind,
    /// File the entry was parsed from. Informational only.
    pub source_file: PathBuf,
}

/// A named, ordered collection of voice entries.
///
/// Entries can only be appended through [`VoiceGroup::push`], which assigns
/// `index == position`, so indices are always contiguous from zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceGroup {
    name: String,
    entries: Vec<VoiceEntry>,
}

impl VoiceGroup {
    /// Creates an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Rebuilds a group from deserialized entries, rejecting gaps or reordering.
    pub fn from_entries(name: impl Into<String>, entries: Vec<VoiceEntry>) -> Result<Self, String> {
        let name = name.into();
        if let Some((position, entry)) = entries
            .iter()
            .enumerate()
            .find(|(position, entry)| entry.index != *position)
        {
            return Err(format!(
                "voice group '{}' has entry index {} at position {}",
                name, entry.index, position
            ));
        }
        Ok(Self { name, entries })
    }

    /// Appends an entry and returns the slot it was assigned.
    pub fn push(
        &mut self,
        macro_name: impl Into<String>,
        args: impl Into<String>,
        source_file: impl Into<PathBuf>,
    ) -> usize {
        let macro_name = macro_name.into();
        let index = self.entries.len();
        self.entries.push(VoiceEntry {
            index,
            kind: VoiceKind::classify(&macro_name),
            macro_name,
            args: args.into(),
            source_file: source_file.into(),
        });
        index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[VoiceEntry] {
        &self.entries
    }

    /// Looks up the voice in slot `index`.
    pub fn entry(&self, index: usize) -> Option<&VoiceEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mapping from group name to voice group, in first-seen order.
///
/// Group names are unique. When the same name is inserted twice the first
/// definition is kept and later ones are discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoicegroupIndex {
    groups: Vec<VoiceGroup>,
    positions: HashMap<String, usize>,
}

impl VoicegroupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a group unless one with the same name already exists.
    ///
    /// Returns `true` if the group was added.
    pub fn insert(&mut self, group: VoiceGroup) -> bool {
        if self.positions.contains_key(group.name()) {
            return false;
        }
        self.positions
            .insert(group.name().to_string(), self.groups.len());
        self.groups.push(group);
        true
    }

    /// Merges another index into this one, first definition winning.
    ///
    /// Returns the number of groups added.
    pub fn merge(&mut self, other: VoicegroupIndex) -> usize {
        other
            .groups
            .into_iter()
            .map(|group| self.insert(group))
            .filter(|added| *added)
            .count()
    }

    pub fn get(&self, name: &str) -> Option<&VoiceGroup> {
        self.positions.get(name).map(|&i| &self.groups[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Group names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VoiceGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of voice entries across all groups.
    pub fn total_voices(&self) -> usize {
        self.groups.iter().map(VoiceGroup::len).sum()
    }
}

impl<'a> IntoIterator for &'a VoicegroupIndex {
    type Item = &'a VoiceGroup;
    type IntoIter = std::slice::Iter<'a, VoiceGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

// Serialized as `{ "<group>": [ {index, macro, args, type, source_file}, ... ] }`
// with groups in insertion order.
impl Serialize for VoicegroupIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(group.name(), group.entries())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for VoicegroupIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IndexVisitor;

        impl<'de> Visitor<'de> for IndexVisitor {
            type Value = VoicegroupIndex;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of voice group names to entry lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut index = VoicegroupIndex::new();
                while let Some((name, entries)) = access.next_entry::<String, Vec<VoiceEntry>>()? {
                    let group = VoiceGroup::from_entries(name, entries).map_err(de::Error::custom)?;
                    index.insert(group);
                }
                Ok(index)
            }
        }

        deserializer.deserialize_map(IndexVisitor)
    }
}
