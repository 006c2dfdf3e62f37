/// Device classification labels and compact label sets.
///
/// `Label` is the closed vocabulary every sighting is classified into.
/// `LabelSet` is a bitset over that vocabulary, used for the configurable
/// "countable" policy and for collecting the labels present in a snapshot.
use core::fmt;

use serde::{Deserialize, Serialize};

/// Classification label for a detected device.
///
/// Variant order is the display order used when cycling filters.
/// The serialized form (and [`Label::as_str`]) is the persisted form in the
/// knowledge document, so renaming a variant breaks stored knowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    Phone,
    Watch,
    Audio,
    Computer,
    Tablet,
    Tag,
    #[serde(rename = "iBeacon")]
    IBeacon,
    Eddystone,
    Sensor,
    Meshtastic,
    #[serde(rename = "HID")]
    Hid,
    Apple,
    Samsung,
    Microsoft,
    Google,
    Garmin,
    #[serde(rename = "OtherBLE")]
    OtherBle,
    Unknown,
}

impl Label {
    /// Every label, in variant order.
    pub const ALL: [Label; 18] = [
        Label::Phone,
        Label::Watch,
        Label::Audio,
        Label::Computer,
        Label::Tablet,
        Label::Tag,
        Label::IBeacon,
        Label::Eddystone,
        Label::Sensor,
        Label::Meshtastic,
        Label::Hid,
        Label::Apple,
        Label::Samsung,
        Label::Microsoft,
        Label::Google,
        Label::Garmin,
        Label::OtherBle,
        Label::Unknown,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Label::Phone => "Phone",
            Label::Watch => "Watch",
            Label::Audio => "Audio",
            Label::Computer => "Computer",
            Label::Tablet => "Tablet",
            Label::Tag => "Tag",
            Label::IBeacon => "iBeacon",
            Label::Eddystone => "Eddystone",
            Label::Sensor => "Sensor",
            Label::Meshtastic => "Meshtastic",
            Label::Hid => "HID",
            Label::Apple => "Apple",
            Label::Samsung => "Samsung",
            Label::Microsoft => "Microsoft",
            Label::Google => "Google",
            Label::Garmin => "Garmin",
            Label::OtherBle => "OtherBLE",
            Label::Unknown => "Unknown",
        }
    }

    /// Parse the persisted string form. Exact match only.
    pub fn parse(s: &str) -> Option<Label> {
        Label::ALL.iter().copied().find(|l| l.as_str() == s)
    }

    /// Strong labels are specific classifications. `Unknown` and
    /// `OtherBLE` are low-confidence fallbacks.
    pub const fn is_strong(self) -> bool {
        !matches!(self, Label::Unknown | Label::OtherBle)
    }

    #[inline]
    const fn bit(self) -> u32 {
        1u32 << (self as u32)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of labels packed into one word. Constant-time insert/contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelSet {
    bits: u32,
}

impl LabelSet {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Build a set from a slice of labels (usable in `const` context).
    pub const fn of(labels: &[Label]) -> Self {
        let mut bits = 0u32;
        let mut i = 0;
        while i < labels.len() {
            bits |= labels[i].bit();
            i += 1;
        }
        Self { bits }
    }

    #[inline]
    pub fn insert(&mut self, label: Label) {
        self.bits |= label.bit();
    }

    #[inline]
    pub fn remove(&mut self, label: Label) {
        self.bits &= !label.bit();
    }

    #[inline]
    pub const fn contains(&self, label: Label) -> bool {
        self.bits & label.bit() != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub const fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Members in variant order.
    pub fn iter(&self) -> impl Iterator<Item = Label> + '_ {
        Label::ALL.iter().copied().filter(move |l| self.contains(*l))
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        let mut set = LabelSet::empty();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

/// Labels that count toward the headline "devices nearby" figure by default.
/// Tags, beacons, sensors and vendor-only classifications stay visible in the
/// ranked lists but are not counted as presence.
pub const COUNTABLE_DEFAULT: LabelSet = LabelSet::of(&[
    Label::Phone,
    Label::Watch,
    Label::Audio,
    Label::Computer,
    Label::Tablet,
    Label::OtherBle,
    Label::Unknown,
]);
