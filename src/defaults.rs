/// Default classification data for BLE advertisements.
///
/// Company identifiers come from the Bluetooth SIG assigned numbers list.
/// Appearance values are 16-bit: the upper 10 bits are the category, the
/// lower 6 bits the sub-category.
use crate::label::Label;

/// Apple's company identifier. Also the prefix of iBeacon frames.
pub const COMPANY_APPLE: u16 = 0x004C;

/// iBeacon framing after the company id: type 0x02, remaining length 0x15.
pub const IBEACON_TYPE: u8 = 0x02;
pub const IBEACON_LEN: u8 = 0x15;

/// Eddystone's reserved 16-bit service UUID.
pub const EDDYSTONE_UUID: u16 = 0xFEAA;

/// Manufacturer company ids mapped to vendor labels.
pub static VENDOR_COMPANY_IDS: &[(u16, Label)] = &[
    (COMPANY_APPLE, Label::Apple),
    (0x0075, Label::Samsung),
    (0x0006, Label::Microsoft),
    (0x00E0, Label::Google),
    (0x0087, Label::Garmin),
];

/// How an appearance table entry is matched.
#[derive(Debug, Clone, Copy)]
pub enum AppearanceMatch {
    /// Full 16-bit appearance value (category + sub-category).
    Exact(u16),
    /// Category only (`appearance >> 6`).
    Category(u16),
}

impl AppearanceMatch {
    pub const fn matches(&self, appearance: u16) -> bool {
        match *self {
            AppearanceMatch::Exact(value) => appearance == value,
            AppearanceMatch::Category(cat) => appearance >> 6 == cat,
        }
    }
}

/// Appearance table. Exact entries precede the category they refine.
pub static APPEARANCE_RULES: &[(AppearanceMatch, Label)] = &[
    (AppearanceMatch::Exact(0x0087), Label::Tablet), // Computer: tablet
    (AppearanceMatch::Category(0x001), Label::Phone),
    (AppearanceMatch::Category(0x002), Label::Computer),
    (AppearanceMatch::Category(0x003), Label::Watch),
    (AppearanceMatch::Category(0x008), Label::Tag),
    (AppearanceMatch::Category(0x00C), Label::Sensor), // thermometer
    (AppearanceMatch::Category(0x00D), Label::Sensor), // heart rate
    (AppearanceMatch::Category(0x012), Label::Sensor), // cycling
    (AppearanceMatch::Category(0x00F), Label::Hid),
    (AppearanceMatch::Category(0x021), Label::Audio), // hands-free / speaker
    (AppearanceMatch::Category(0x024), Label::Audio), // audio sink
    (AppearanceMatch::Category(0x025), Label::Audio), // earbud, headset
];

/// Appearance 0x0000 is "Generic Unknown" and carries no information.
pub const APPEARANCE_UNKNOWN: u16 = 0x0000;

/// Device name keyword rules (lowercase, substring match), in precedence
/// order. Watch and audio come before phone so "Galaxy Watch" and
/// "headphones" are not taken for phones.
pub static NAME_RULES: &[(&[&str], Label)] = &[
    (&["meshtastic"], Label::Meshtastic),
    (&["beacon"], Label::IBeacon),
    (&["sensor", "thermo"], Label::Sensor),
    (&["tag", "tile"], Label::Tag),
    (&["watch"], Label::Watch),
    (
        &[
            "airpods", "buds", "headphone", "headset", "speaker", "jbl", "bose", "beats", "sony",
        ],
        Label::Audio,
    ),
    (&["phone", "iphone", "pixel", "galaxy"], Label::Phone),
    (&["macbook", "laptop", "pc"], Label::Computer),
    (&["ipad", "tablet"], Label::Tablet),
    (&["keyboard", "mouse", "remote"], Label::Hid),
    (&["apple"], Label::Apple),
    (&["samsung"], Label::Samsung),
    (&["microsoft"], Label::Microsoft),
    (&["google"], Label::Google),
    (&["garmin"], Label::Garmin),
];
