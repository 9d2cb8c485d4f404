//! Decide whether a property is free for a candidate range.
//!
//! Every blocking reservation is tested twice, independently:
//!
//! 1. **occupied now** -- the clock's current instant lies inside the reservation.
//! 2. **overlaps candidate** -- the candidate start or end lies inside the
//!    reservation, or the candidate strictly engulfs it.
//!
//! Either hit marks the property occupied and pushes `occupied_until` to the
//! latest conflicting end date. The scan never stops early, so the reported date
//! is the true maximum across the whole snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StayError};
use crate::range::CandidateRange;
use crate::reservation::Reservation;

/// How reservation and candidate boundaries compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Both ends of every range are included. A candidate that ends on the day
    /// another reservation starts is a conflict.
    #[default]
    Inclusive,
    /// Ranges are `[start, end)`. Back-to-back stays do not conflict.
    HalfOpen,
}

/// Outcome of an availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResult {
    pub is_occupied: bool,
    /// Latest end date among all conflicting reservations.
    pub occupied_until: Option<DateTime<Utc>>,
}

impl AvailabilityResult {
    fn record(&mut self, end: DateTime<Utc>) {
        self.is_occupied = true;
        self.occupied_until = Some(self.occupied_until.map_or(end, |until| until.max(end)));
    }
}

/// Availability checker bound to a clock and an overlap policy.
pub struct AvailabilityChecker<C = SystemClock> {
    clock: C,
    policy: OverlapPolicy,
}

impl Default for AvailabilityChecker<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl AvailabilityChecker<SystemClock> {
    pub fn new() -> Self {
        Self {
            clock: SystemClock,
            policy: OverlapPolicy::default(),
        }
    }
}

impl<C: Clock> AvailabilityChecker<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            policy: OverlapPolicy::default(),
        }
    }

    pub fn policy(mut self, policy: OverlapPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Check `[start, end]` for `property_id` against a reservation snapshot.
    ///
    /// The range is normalized first (see [`CandidateRange::new`]).
    ///
    /// # Errors
    /// Returns `StayError::EmptyPropertyId` if `property_id` is empty.
    pub fn check(
        &self,
        property_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        reservations: &[Reservation],
    ) -> Result<AvailabilityResult> {
        self.check_range(property_id, &CandidateRange::new(start, end), reservations)
    }

    /// Same as [`check`](Self::check) for an already-normalized range.
    pub fn check_range(
        &self,
        property_id: &str,
        candidate: &CandidateRange,
        reservations: &[Reservation],
    ) -> Result<AvailabilityResult> {
        if property_id.is_empty() {
            return Err(StayError::EmptyPropertyId);
        }

        let now = self.clock.now();
        let mut result = AvailabilityResult::default();
        let mut scanned = 0usize;

        for r in reservations {
            // Cancelled rows are dropped even if the caller already filtered.
            if !r.status.blocks_availability() {
                continue;
            }
            if r.property_id != property_id {
                tracing::debug!(
                    reservation = %r.id,
                    expected = property_id,
                    found = %r.property_id,
                    "skipping reservation for another property"
                );
                continue;
            }
            scanned += 1;

            if self.occupies(r, now) {
                result.record(r.end_date);
            }
            if self.overlaps(r, candidate) {
                result.record(r.end_date);
            }
        }

        tracing::debug!(
            property_id,
            scanned,
            occupied = result.is_occupied,
            until = ?result.occupied_until,
            "availability checked"
        );
        Ok(result)
    }

    fn occupies(&self, r: &Reservation, instant: DateTime<Utc>) -> bool {
        match self.policy {
            OverlapPolicy::Inclusive => r.contains(instant),
            OverlapPolicy::HalfOpen => r.start_date <= instant && instant < r.end_date,
        }
    }

    fn overlaps(&self, r: &Reservation, c: &CandidateRange) -> bool {
        match self.policy {
            OverlapPolicy::Inclusive => {
                r.contains(c.start)
                    || r.contains(c.end)
                    || (c.start < r.start_date && c.end > r.end_date)
            }
            OverlapPolicy::HalfOpen => c.start < r.end_date && r.start_date < c.end,
        }
    }
}

/// Check availability using the system clock and inclusive boundaries.
///
/// # Errors
/// Returns `StayError::EmptyPropertyId` if `property_id` is empty.
pub fn check_availability(
    property_id: &str,
    candidate_start: DateTime<Utc>,
    candidate_end: DateTime<Utc>,
    existing_reservations: &[Reservation],
) -> Result<AvailabilityResult> {
    AvailabilityChecker::new().check(
        property_id,
        candidate_start,
        candidate_end,
        existing_reservations,
    )
}
