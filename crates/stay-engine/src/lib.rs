//! # stay-engine
//!
//! Booking availability and overlap detection for short-stay rentals.
//!
//! The core is a pure decision function: given a property, a candidate date
//! range and a snapshot of existing reservations, report whether the property
//! is taken and until when. Around it sit the reservation model, night and price
//! arithmetic, a repository/listener seam and the booking submission step.
//!
//! ## Modules
//!
//! - [`availability`] — the availability checker and overlap policies
//! - [`range`] — candidate range normalization, nights, quotes
//! - [`reservation`] — reservation model and status transitions
//! - [`repository`] — pull/push reservation interfaces, in-memory store
//! - [`booking`] — phone validation, pending booking creation, confirm/cancel
//! - [`clock`] — injectable "now"
//! - [`parse`] — timestamp and reservation-document parsing
//! - [`error`] — Error types

pub mod availability;
pub mod booking;
pub mod clock;
pub mod error;
pub mod parse;
pub mod range;
pub mod repository;
pub mod reservation;

pub use availability::{check_availability, AvailabilityChecker, AvailabilityResult, OverlapPolicy};
pub use booking::{cancel_booking, confirm_booking, submit_booking, BookingRequest, PhoneNumber};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::StayError;
pub use parse::{parse_instant, parse_reservations};
pub use range::{nights, quote, CandidateRange, Quote};
pub use repository::{InMemoryReservations, ReservationFeed, ReservationSource};
pub use reservation::{Reservation, ReservationId, ReservationStatus};
