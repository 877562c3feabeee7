use chrono::{DateTime, Utc};

/// Half-open interval intersection: `[a_start, a_end)` meets `[b_start, b_end)`.
/// Adjacent windows (one ending exactly where the other starts) do not overlap.
pub fn windows_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}
