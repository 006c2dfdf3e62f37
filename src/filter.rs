/// Display filter selection and cycling.
///
/// The user steps through `ALL` followed by each label currently present
/// among active devices. The filter only narrows the ranked lists; the
/// headline count always covers every active device.
use core::fmt;

use serde::{Serialize, Serializer};

use crate::label::{Label, LabelSet};
use crate::tracker::ActivityView;

/// Active display filter. Orders `All` first, then labels in variant order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LabelFilter {
    #[default]
    All,
    Only(Label),
}

impl LabelFilter {
    pub fn matches(&self, label: Label) -> bool {
        match self {
            LabelFilter::All => true,
            LabelFilter::Only(only) => *only == label,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            LabelFilter::All => "ALL",
            LabelFilter::Only(label) => label.as_str(),
        }
    }
}

impl fmt::Display for LabelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LabelFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Discrete command from the input layer (buttons or host).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterCommand {
    Next,
    Previous,
}

/// Labels present among the given active devices.
pub fn present_labels(active: &[ActivityView]) -> LabelSet {
    active.iter().map(|v| v.label).collect()
}

/// Step the filter through `[ALL] + present`, wrapping at either end.
///
/// If the current filter's label is no longer present, the step moves to
/// the neighbouring option in label order, as if it were still listed.
pub fn cycle(current: LabelFilter, cmd: FilterCommand, present: LabelSet) -> LabelFilter {
    let mut options =
        core::iter::once(LabelFilter::All).chain(present.iter().map(LabelFilter::Only));
    match cmd {
        FilterCommand::Next => options
            .find(|&opt| opt > current)
            .unwrap_or(LabelFilter::All),
        FilterCommand::Previous => {
            let mut before = None;
            let mut last = LabelFilter::All;
            for opt in options {
                if opt < current {
                    before = Some(opt);
                }
                last = opt;
            }
            before.unwrap_or(last)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(labels: &[Label]) -> LabelSet {
        labels.iter().copied().collect()
    }

    #[test]
    fn all_matches_everything() {
        for label in Label::ALL {
            assert!(LabelFilter::All.matches(label));
        }
    }

    #[test]
    fn only_matches_exact_label() {
        let f = LabelFilter::Only(Label::Phone);
        assert!(f.matches(Label::Phone));
        assert!(!f.matches(Label::Watch));
    }

    #[test]
    fn next_cycles_through_present_labels() {
        let present = set(&[Label::Watch, Label::Phone, Label::Tag]);
        let mut f = LabelFilter::All;
        let mut seen = heapless::Vec::<LabelFilter, 8>::new();
        for _ in 0..5 {
            f = cycle(f, FilterCommand::Next, present);
            seen.push(f).unwrap();
        }
        assert_eq!(
            seen.as_slice(),
            &[
                LabelFilter::Only(Label::Phone),
                LabelFilter::Only(Label::Watch),
                LabelFilter::Only(Label::Tag),
                LabelFilter::All,
                LabelFilter::Only(Label::Phone),
            ]
        );
    }

    #[test]
    fn previous_wraps_from_all_to_last() {
        let present = set(&[Label::Phone, Label::Sensor]);
        let f = cycle(LabelFilter::All, FilterCommand::Previous, present);
        assert_eq!(f, LabelFilter::Only(Label::Sensor));
        let f = cycle(f, FilterCommand::Previous, present);
        assert_eq!(f, LabelFilter::Only(Label::Phone));
        let f = cycle(f, FilterCommand::Previous, present);
        assert_eq!(f, LabelFilter::All);
    }

    #[test]
    fn nothing_present_stays_on_all() {
        let empty = LabelSet::empty();
        assert_eq!(cycle(LabelFilter::All, FilterCommand::Next, empty), LabelFilter::All);
        assert_eq!(cycle(LabelFilter::All, FilterCommand::Previous, empty), LabelFilter::All);
    }

    #[test]
    fn vanished_label_steps_to_neighbour() {
        let present = set(&[Label::Phone, Label::Tag]);
        let stale = LabelFilter::Only(Label::Audio);
        assert_eq!(cycle(stale, FilterCommand::Next, present), LabelFilter::Only(Label::Tag));
        assert_eq!(
            cycle(stale, FilterCommand::Previous, present),
            LabelFilter::Only(Label::Phone)
        );
        let stale_last = LabelFilter::Only(Label::Unknown);
        assert_eq!(cycle(stale_last, FilterCommand::Next, present), LabelFilter::All);
    }

    #[test]
    fn filter_serializes_as_string() {
        let mut buf = [0u8; 16];
        let len = serde_json_core::to_slice(&LabelFilter::All, &mut buf).unwrap();
        assert_eq!(&buf[..len], br#""ALL""#);
        let len = serde_json_core::to_slice(&LabelFilter::Only(Label::IBeacon), &mut buf).unwrap();
        assert_eq!(&buf[..len], br#""iBeacon""#);
    }
}
