//! WASM bindings for stay-engine.
//!
//! Exposes the availability checker, night counting and phone validation to the
//! booking front end via `wasm-bindgen`. Complex values cross the boundary as
//! JSON strings; reservation snapshots use the same document layout the front
//! end already reads (`propertyId`, `startDate`, `endDate`, `status`).
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p stay-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir pkg/ \
//!   target/wasm32-unknown-unknown/release/stay_engine_wasm.wasm
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use stay_engine::{AvailabilityChecker, CandidateRange, FixedClock, OverlapPolicy, PhoneNumber};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityDto {
    is_occupied: bool,
    occupied_until: Option<String>,
    /// The range actually checked, after end-before-start correction.
    start: String,
    end: String,
    corrected: bool,
    nights: i64,
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, JsValue> {
    stay_engine::parse_instant(s).map_err(js_err)
}

fn parse_policy(policy: Option<String>) -> Result<OverlapPolicy, JsValue> {
    match policy.as_deref() {
        None | Some("inclusive") => Ok(OverlapPolicy::Inclusive),
        Some("half-open") => Ok(OverlapPolicy::HalfOpen),
        Some(other) => Err(JsValue::from_str(&format!(
            "Unknown overlap policy '{}'. Expected 'inclusive' or 'half-open'",
            other
        ))),
    }
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Check whether a property is free for `[start, end]`.
///
/// `reservations_json` is a JSON array of reservation documents. `now` defaults
/// to the current time; `policy` is `"inclusive"` (default) or `"half-open"`.
/// Returns a JSON object with `isOccupied`, `occupiedUntil` and the normalized
/// range.
#[wasm_bindgen(js_name = "checkAvailability")]
pub fn check_availability(
    property_id: &str,
    start: &str,
    end: &str,
    reservations_json: &str,
    now: Option<String>,
    policy: Option<String>,
) -> Result<String, JsValue> {
    let reservations = stay_engine::parse_reservations(reservations_json).map_err(js_err)?;
    let now = match now {
        Some(raw) => parse_datetime(&raw)?,
        None => Utc::now(),
    };
    let range = CandidateRange::new(parse_datetime(start)?, parse_datetime(end)?);

    let checker = AvailabilityChecker::with_clock(FixedClock(now)).policy(parse_policy(policy)?);
    let result = checker
        .check_range(property_id, &range, &reservations)
        .map_err(js_err)?;

    let dto = AvailabilityDto {
        is_occupied: result.is_occupied,
        occupied_until: result.occupied_until.map(|dt| dt.to_rfc3339()),
        start: range.start.to_rfc3339(),
        end: range.end.to_rfc3339(),
        corrected: range.corrected,
        nights: range.nights(),
    };
    serde_json::to_string(&dto).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Nights between two dates, rounded up, without range correction.
#[wasm_bindgen(js_name = "countNights")]
pub fn count_nights(start: &str, end: &str) -> Result<u32, JsValue> {
    let n = stay_engine::nights(parse_datetime(start)?, parse_datetime(end)?);
    u32::try_from(n).map_err(|_| JsValue::from_str(&format!("Night count out of range: {}", n)))
}

/// Price a stay. Returns a JSON object with `nights`, `nightlyRate` and `total`.
#[wasm_bindgen(js_name = "quoteStay")]
pub fn quote_stay(start: &str, end: &str, nightly_rate: u32) -> Result<String, JsValue> {
    let range = CandidateRange::new(parse_datetime(start)?, parse_datetime(end)?);
    let quote = stay_engine::quote(&range, u64::from(nightly_rate));
    serde_json::to_string(&quote).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Canonical form of a phone number, or an error describing why it was refused.
#[wasm_bindgen(js_name = "normalizePhone")]
pub fn normalize_phone(raw: &str) -> Result<String, JsValue> {
    PhoneNumber::parse(raw).map(String::from).map_err(js_err)
}
