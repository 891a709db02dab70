//! Flowers wilt once they go untended: `after` past their planting or their
//! last revive. The flag is derived on read; stored rows keep what was written.

use chrono::{DateTime, Duration, Utc};
use garden_core::FlowerRecord;

fn tended_at(row: &FlowerRecord) -> Option<DateTime<Utc>> {
    let raw = row.revived_at.as_deref().unwrap_or(&row.created_at);
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Marks `row` wilted when it has gone untended for `after`. Rows whose
/// timestamps do not parse are left alone. Returns whether the row changed.
pub fn wilt_by_age(row: &mut FlowerRecord, now: DateTime<Utc>, after: Duration) -> bool {
    if !row.is_alive() {
        return false;
    }
    match tended_at(row) {
        Some(at) if now - at >= after => {
            row.wilted = Some(true);
            true
        }
        _ => false,
    }
}
