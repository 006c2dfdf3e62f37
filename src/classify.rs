/// Heuristic device classifier for BLE advertisements.
///
/// Classification is an ordered list of rules; the first rule that returns
/// a label wins. Every rule is a plain function over [`AdvertFields`], so
/// each one can be tested on its own. The classifier never fails: when no
/// rule matches, the result is `OtherBLE` if the advertisement carried
/// anything at all and `Unknown` otherwise.
use crate::defaults::{
    APPEARANCE_RULES, APPEARANCE_UNKNOWN, COMPANY_APPLE, EDDYSTONE_UUID, IBEACON_LEN,
    IBEACON_TYPE, NAME_RULES, VENDOR_COMPANY_IDS,
};
use crate::label::Label;

/// Input data for classifying one advertisement
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvertFields<'a> {
    pub name: &'a str,
    /// 16-bit service UUIDs found in advertisement
    pub service_uuids_16: &'a [u16],
    /// Manufacturer company ID, if manufacturer data was present
    pub manufacturer_id: Option<u16>,
    /// Manufacturer payload after the company ID
    pub manufacturer_data: &'a [u8],
    pub appearance: Option<u16>,
}

impl AdvertFields<'_> {
    /// Appearance, ignoring the "Generic Unknown" value.
    fn known_appearance(&self) -> Option<u16> {
        self.appearance.filter(|&a| a != APPEARANCE_UNKNOWN)
    }

    /// Whether the advertisement carried any classifiable field.
    pub fn has_any_field(&self) -> bool {
        !self.name.is_empty()
            || !self.service_uuids_16.is_empty()
            || self.manufacturer_id.is_some()
            || self.appearance.is_some()
    }
}

/// A named classification rule.
#[derive(Clone, Copy)]
pub struct ClassifyRule {
    pub name: &'static str,
    pub check: fn(&AdvertFields<'_>) -> Option<Label>,
}

/// Rules in precedence order.
pub static RULES: &[ClassifyRule] = &[
    ClassifyRule {
        name: "ibeacon",
        check: match_ibeacon,
    },
    ClassifyRule {
        name: "eddystone",
        check: match_eddystone,
    },
    ClassifyRule {
        name: "vendor",
        check: match_vendor,
    },
    ClassifyRule {
        name: "appearance",
        check: match_appearance,
    },
    ClassifyRule {
        name: "name",
        check: match_name,
    },
];

/// Classify an advertisement.
pub fn classify(adv: &AdvertFields<'_>) -> Label {
    explain(adv).0
}

/// Classify an advertisement and report which rule decided it
/// (`None` for the fallback).
pub fn explain(adv: &AdvertFields<'_>) -> (Label, Option<&'static str>) {
    for rule in RULES {
        if let Some(label) = (rule.check)(adv) {
            return (label, Some(rule.name));
        }
    }
    let fallback = if adv.has_any_field() {
        Label::OtherBle
    } else {
        Label::Unknown
    };
    (fallback, None)
}

/// Apple company id followed by iBeacon type and length bytes.
pub fn match_ibeacon(adv: &AdvertFields<'_>) -> Option<Label> {
    let is_ibeacon = adv.manufacturer_id == Some(COMPANY_APPLE)
        && adv.manufacturer_data.len() >= 2
        && adv.manufacturer_data[0] == IBEACON_TYPE
        && adv.manufacturer_data[1] == IBEACON_LEN;
    is_ibeacon.then_some(Label::IBeacon)
}

pub fn match_eddystone(adv: &AdvertFields<'_>) -> Option<Label> {
    adv.service_uuids_16
        .contains(&EDDYSTONE_UUID)
        .then_some(Label::Eddystone)
}

pub fn match_vendor(adv: &AdvertFields<'_>) -> Option<Label> {
    let id = adv.manufacturer_id?;
    VENDOR_COMPANY_IDS
        .iter()
        .find(|&&(company, _)| company == id)
        .map(|&(_, label)| label)
}

pub fn match_appearance(adv: &AdvertFields<'_>) -> Option<Label> {
    let appearance = adv.known_appearance()?;
    APPEARANCE_RULES
        .iter()
        .find(|(m, _)| m.matches(appearance))
        .map(|&(_, label)| label)
}

/// Name keywords, consulted only when no appearance is advertised.
pub fn match_name(adv: &AdvertFields<'_>) -> Option<Label> {
    if adv.known_appearance().is_some() || adv.name.is_empty() {
        return None;
    }

    let mut lower = heapless::String::<64>::new();
    for c in adv.name.chars() {
        if lower.push(c.to_ascii_lowercase()).is_err() {
            break;
        }
    }

    NAME_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| lower.contains(*kw)))
        .map(|&(_, label)| label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> AdvertFields<'_> {
        AdvertFields {
            name,
            ..Default::default()
        }
    }

    #[test]
    fn empty_advert_is_unknown() {
        let adv = AdvertFields::default();
        assert_eq!(explain(&adv), (Label::Unknown, None));
    }

    #[test]
    fn unmatched_fields_fall_back_to_other() {
        let adv = named("XJ-9000");
        assert_eq!(explain(&adv), (Label::OtherBle, None));

        let uuids = [0x180D];
        let adv = AdvertFields {
            service_uuids_16: &uuids,
            ..Default::default()
        };
        assert_eq!(classify(&adv), Label::OtherBle);

        let adv = AdvertFields {
            manufacturer_id: Some(0x1234),
            ..Default::default()
        };
        assert_eq!(classify(&adv), Label::OtherBle);
    }

    #[test]
    fn ibeacon_beats_apple_vendor() {
        let data = [0x02, 0x15, 0x00];
        let adv = AdvertFields {
            manufacturer_id: Some(0x004C),
            manufacturer_data: &data,
            ..Default::default()
        };
        assert_eq!(explain(&adv), (Label::IBeacon, Some("ibeacon")));
    }

    #[test]
    fn apple_without_ibeacon_framing_is_vendor() {
        let data = [0x10, 0x05];
        let adv = AdvertFields {
            manufacturer_id: Some(0x004C),
            manufacturer_data: &data,
            ..Default::default()
        };
        assert_eq!(explain(&adv), (Label::Apple, Some("vendor")));
    }

    #[test]
    fn ibeacon_framing_needs_apple_company() {
        let data = [0x02, 0x15];
        let adv = AdvertFields {
            manufacturer_id: Some(0x0075),
            manufacturer_data: &data,
            ..Default::default()
        };
        assert_eq!(classify(&adv), Label::Samsung);
    }

    #[test]
    fn eddystone_beats_vendor_and_appearance() {
        let uuids = [0x180F, 0xFEAA];
        let adv = AdvertFields {
            service_uuids_16: &uuids,
            manufacturer_id: Some(0x00E0),
            appearance: Some(0x0040),
            ..Default::default()
        };
        assert_eq!(explain(&adv), (Label::Eddystone, Some("eddystone")));
    }

    #[test]
    fn vendor_beats_appearance() {
        let adv = AdvertFields {
            manufacturer_id: Some(0x0087),
            appearance: Some(0x00C1),
            ..Default::default()
        };
        assert_eq!(classify(&adv), Label::Garmin);
    }

    #[test]
    fn appearance_table() {
        let cases = [
            (0x0040, Label::Phone),
            (0x0080, Label::Computer),
            (0x0087, Label::Tablet),
            (0x00C2, Label::Watch),
            (0x0200, Label::Tag),
            (0x0300, Label::Sensor),
            (0x0341, Label::Sensor),
            (0x0485, Label::Sensor),
            (0x03C1, Label::Hid),
            (0x0941, Label::Audio),
            (0x0942, Label::Audio),
            (0x0841, Label::Audio),
        ];
        for (appearance, expected) in cases {
            let adv = AdvertFields {
                appearance: Some(appearance),
                ..Default::default()
            };
            assert_eq!(classify(&adv), expected, "appearance {appearance:#06x}");
        }
    }

    #[test]
    fn appearance_suppresses_name_rules() {
        // Unmatched appearance with a phone-like name: name is not consulted.
        let adv = AdvertFields {
            name: "Pixel 8",
            appearance: Some(0x0C40),
            ..Default::default()
        };
        assert_eq!(classify(&adv), Label::OtherBle);
    }

    #[test]
    fn generic_unknown_appearance_allows_name_rules() {
        let adv = AdvertFields {
            name: "Pixel 8",
            appearance: Some(0x0000),
            ..Default::default()
        };
        assert_eq!(classify(&adv), Label::Phone);
    }

    #[test]
    fn name_rules_case_insensitive() {
        assert_eq!(classify(&named("Meshtastic_1a2b")), Label::Meshtastic);
        assert_eq!(classify(&named("MESHTASTIC")), Label::Meshtastic);
        assert_eq!(classify(&named("Kontakt Beacon")), Label::IBeacon);
        assert_eq!(classify(&named("ThermoPro TP357")), Label::Sensor);
        assert_eq!(classify(&named("Tile")), Label::Tag);
        assert_eq!(classify(&named("John's iPhone")), Label::Phone);
        assert_eq!(classify(&named("JBL Flip 6")), Label::Audio);
        assert_eq!(classify(&named("Bob's MacBook Pro")), Label::Computer);
        assert_eq!(classify(&named("iPad")), Label::Tablet);
        assert_eq!(classify(&named("MX Keyboard")), Label::Hid);
        assert_eq!(classify(&named("Garmin Edge")), Label::Garmin);
    }

    #[test]
    fn name_rule_precedence() {
        assert_eq!(classify(&named("Galaxy Watch6")), Label::Watch);
        assert_eq!(classify(&named("Galaxy Buds2")), Label::Audio);
        assert_eq!(classify(&named("WH-1000XM4 Headphones")), Label::Audio);
        assert_eq!(classify(&named("Meshtastic Beacon")), Label::Meshtastic);
    }

    #[test]
    fn non_ascii_name_does_not_panic() {
        assert_eq!(classify(&named("Ünïcödé Watch")), Label::Watch);
        assert_eq!(classify(&named("日本語")), Label::OtherBle);
    }

    #[test]
    fn each_rule_reports_its_own_name() {
        let names: heapless::Vec<&str, 8> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names.as_slice(),
            &["ibeacon", "eddystone", "vendor", "appearance", "name"]
        );
    }
}
