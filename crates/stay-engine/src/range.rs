//! Candidate date ranges, night counts and price quotes.
//!
//! A candidate range is what a prospective guest asks about. Its end must be
//! strictly after its start; an inverted or empty range is pushed out to a
//! one-day window starting at `start` instead of being rejected.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// A normalized `[start, end]` range with `end > start`.
///
/// Deserializing goes through [`CandidateRange::new`]; a serialized
/// `corrected` flag is ignored and recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RequestedRange")]
pub struct CandidateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Set when the requested end was at or before `start` and got replaced.
    pub corrected: bool,
}

#[derive(Deserialize)]
struct RequestedRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl From<RequestedRange> for CandidateRange {
    fn from(raw: RequestedRange) -> Self {
        Self::new(raw.start, raw.end)
    }
}

impl CandidateRange {
    /// Build a range, replacing `end` with `start + 1 day` when `end <= start`.
    ///
    /// Within a day of `DateTime::<Utc>::MAX_UTC` the corrected end saturates
    /// at that maximum.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if end > start {
            return Self {
                start,
                end,
                corrected: false,
            };
        }

        let fixed = start
            .checked_add_signed(Duration::days(1))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        tracing::debug!(
            %start,
            requested_end = %end,
            corrected_end = %fixed,
            "candidate end not after start, using one-day window"
        );
        Self {
            start,
            end: fixed,
            corrected: true,
        }
    }

    /// Nights covered by this range. Always at least 1.
    pub fn nights(&self) -> i64 {
        nights(self.start, self.end)
    }
}

/// Number of nights between two instants: `ceil(|end - start| / 1 day)`.
///
/// No normalization is applied, so `nights(d, d) == 0`.
pub fn nights(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds().abs();
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// Price breakdown for a stay, in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub nights: i64,
    pub nightly_rate: u64,
    pub total: u64,
}

/// Quote `range` at `nightly_rate`. The total saturates instead of wrapping.
pub fn quote(range: &CandidateRange, nightly_rate: u64) -> Quote {
    let nights = range.nights();
    let total = u64::try_from(nights)
        .unwrap_or(0)
        .saturating_mul(nightly_rate);
    Quote {
        nights,
        nightly_rate,
        total,
    }
}
