//! Allow-list filter for recognized plate text
//!
//! Bangladeshi registration plates carry a district name, a vehicle-class
//! letter, and digit groups, all in Bengali script. Recognizer output is
//! only kept when it exactly matches one of these fixed vocabularies.
//!
//! The three lists are immutable process-wide data; `classify` is a pure
//! function over them.

/// District names as printed on registration plates
pub const DISTRICTS: &[&str] = &[
    "ঢাকা",
    "ঢাকা মেট্রো",
    "টাংগাইল",
    "চট্টগাম",
    "চট্র মেট্রো",
    "খুলনা",
    "খুলনা মেট্রো",
    "বরিশাল",
    "বরিশাল মেট্রো",
    "কক্সবাজার",
    "নেত্রকোণা",
    "রংপুর",
    "রাজ মেট্রো",
    "ভোলা",
    "রাজশাহী",
    "কুষ্টিয়া",
    "নারায়ণগঞ্জ",
    "বগুড়া",
    "সিরাজগঞ্জ",
    "কুমিল্লা",
    "ময়মনসিংহ",
    "ঝিনাইদহ",
    "সিলেট",
    "হবিগঞ্জ",
    "নাটোর",
    "পাবনা",
    "যোশর",
    "বরগুনা",
    "নীলফামারী",
    "পটুয়াখালী",
    "জামালপুর",
    "পিরোজপুর",
    "ব্রাক্ষণবাড়িয়া",
    "মানিকগঞ্জ",
    "নোয়াখালী",
    "বাগেরহাট",
    "সুনামগঞ্জ",
    "চুয়াডাংগা",
    "গোপালগঞ্জ",
    "পঞ্চগড়",
    "লক্ষীপুর",
    "শেরপুর",
    "ঝালকাঠি",
    "খাগড়াছড়ি",
    "কিশোরগঞ্জ",
    "সাতক্ষীরা",
    "নরসিংদী",
    "মৌলভীবাজার",
    "কড়িগ্রাম",
    "শড়িয়তপুর",
    "মাদারীপুর",
    "গাইবান্ধা",
    "রাজবাড়ী",
    "নওয়াবগঞ্জ",
    "রাঙ্গামাটি",
    "চুয়াডাঙ্গা",
    "মুন্সীগঞ্জ",
    "নওগাঁ",
    "গাজীপুর",
    "মেহেরপুর",
    "চাঁপাইনবাবগঞ্জ",
    "বান্দরবান",
    "চাঁদপুর",
    "জয়পুরহাট",
    "নড়াইল",
    "ফরিদপুর",
    "ঠাকুরগাঁও",
    "লালমনিরহাট",
];

/// Vehicle-class letters that appear between district and serial
pub const ALLOWED_CHARS: &[&str] = &[
    "গ", "হ", "ল", "ঘ", "চ", "ট", "থ", "এ", "ক", "খ", "ভ", "প", "ছ", "জ", "ঝ", "ব", "স", "ত",
    "দ", "ফ", "ঠ", "ম", "ন", "অ", "ড", "উ", "ঢ", "শ", "ই", "য", "র",
];

/// Bengali digit glyphs
pub const ALLOWED_DIGITS: &[char] = &['০', '১', '২', '৩', '৪', '৫', '৬', '৭', '৮', '৯'];

/// Classify a recognized string against the plate vocabularies
///
/// The input is trimmed of surrounding whitespace, then accepted when it is
/// a full district name, a single vehicle-class letter, or a non-empty run
/// of Bengali digits. An empty string is rejected: it carries no
/// information even though "all characters are digits" would hold
/// vacuously.
#[must_use]
pub fn classify(text: &str) -> bool {
    let text = text.trim();

    if text.is_empty() {
        return false;
    }
    if DISTRICTS.contains(&text) {
        return true;
    }
    if ALLOWED_CHARS.contains(&text) {
        return true;
    }
    text.chars().all(|ch| ALLOWED_DIGITS.contains(&ch))
}
