//! Parser for `PROF{slot}.CSV` profile files.

use tracing::debug;

use crate::models::{ActivityLevel, DeviceGender, ScaleProfile};

use super::numeric::{parse_decimal, parse_integer, strip_quotes};
use super::record::{FieldSetter, KeyValueLine};

/// Profile key codes and where they land.
static PROFILE_FIELDS: &[(&str, FieldSetter<ScaleProfile>)] = &[
    ("DB", |p: &mut ScaleProfile, v: &str| {
        p.birth_date = Some(strip_quotes(v).to_string())
    }),
    ("GE", |p: &mut ScaleProfile, v: &str| {
        p.gender = parse_integer(v).and_then(DeviceGender::from_code)
    }),
    ("Hm", |p: &mut ScaleProfile, v: &str| p.height_cm = parse_decimal(v)),
    ("AL", |p: &mut ScaleProfile, v: &str| {
        p.activity_level = parse_integer(v).and_then(ActivityLevel::from_code)
    }),
    ("Bt", |p: &mut ScaleProfile, v: &str| {
        p.athlete_mode = parse_integer(v).map(|n| n == 1)
    }),
    ("CS", |p: &mut ScaleProfile, v: &str| {
        p.profile_code = Some(strip_quotes(v).to_string())
    }),
];

/// Parse a profile file. Only the first non-blank line is read.
///
/// Returns `None` when the file holds no key/value pairs at all.
pub fn parse_profile(content: &str, slot: u8) -> Option<ScaleProfile> {
    let line = content.lines().find(|l| !l.trim().is_empty())?;
    let record = KeyValueLine::parse(line);
    if record.is_empty() {
        return None;
    }

    let mut profile = ScaleProfile::new(slot);
    let applied = record.apply(&mut profile, PROFILE_FIELDS);
    debug!(
        slot,
        fields = applied,
        profile_code = profile.profile_code.as_deref().unwrap_or(""),
        "Parsed scale profile"
    );
    Some(profile)
}
