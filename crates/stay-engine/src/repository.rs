//! Reservation storage seams.
//!
//! [`ReservationSource`] is a pull interface (fetch the current snapshot for a
//! property). [`ReservationFeed`] is the push interface: listeners get the full
//! snapshot on subscribe and again after every change to that property.
//! [`InMemoryReservations`] implements both.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{ReentrantMutex, RwLock};

use crate::availability::{AvailabilityChecker, AvailabilityResult};
use crate::clock::Clock;
use crate::error::{Result, StayError};
use crate::range::CandidateRange;
use crate::reservation::{Reservation, ReservationId, ReservationStatus};

/// Callback invoked with a property's reservation snapshot.
pub type Listener = Arc<dyn Fn(&[Reservation]) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub trait ReservationSource {
    /// All stored reservations for `property_id`, ordered by id.
    fn reservations_for(&self, property_id: &str) -> Result<Vec<Reservation>>;
}

pub trait ReservationFeed {
    fn subscribe(&self, property_id: &str, listener: Listener) -> Result<SubscriptionId>;

    /// Returns `false` when `id` was not (or no longer) subscribed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// New reservation data before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub property_id: String,
    pub user_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ReservationStatus,
}

struct Subscriber {
    property_id: String,
    listener: Listener,
    /// Store version of the last snapshot handed to this listener.
    delivered: AtomicU64,
}

#[derive(Default)]
struct State {
    reservations: BTreeMap<ReservationId, Reservation>,
    subscribers: BTreeMap<SubscriptionId, Arc<Subscriber>>,
    /// Bumped on every mutation.
    version: u64,
}

/// Thread-safe in-memory reservation store.
///
/// Snapshot and delivery happen under one dispatch lock, so listeners see
/// snapshots in store order. A listener is never handed a snapshot older than
/// one it already received, even when it writes back into the store.
#[derive(Default)]
pub struct InMemoryReservations {
    state: RwLock<State>,
    dispatch: ReentrantMutex<()>,
    next_reservation: AtomicU64,
    next_subscription: AtomicU64,
}

impl InMemoryReservations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from an existing snapshot, keeping the given ids.
    ///
    /// # Errors
    /// `StayError::DuplicateReservation` if two reservations share an id,
    /// `StayError::IdOverflow` if an id leaves no room for new ones.
    pub fn from_snapshot(reservations: impl IntoIterator<Item = Reservation>) -> Result<Self> {
        let mut seeded = BTreeMap::new();
        for r in reservations {
            if let Some(existing) = seeded.insert(r.id, r) {
                return Err(StayError::DuplicateReservation(existing.id));
            }
        }
        let next = match seeded.keys().next_back() {
            Some(id) => id.0.checked_add(1).ok_or(StayError::IdOverflow)?,
            None => 0,
        };

        let store = Self::new();
        store.state.write().reservations = seeded;
        store.next_reservation.store(next, Ordering::Relaxed);
        Ok(store)
    }

    pub fn insert(&self, new: NewReservation) -> Result<Reservation> {
        if new.property_id.is_empty() {
            return Err(StayError::EmptyPropertyId);
        }
        let id = self
            .next_reservation
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .map(ReservationId)
            .map_err(|_| StayError::IdOverflow)?;
        let reservation = Reservation {
            id,
            property_id: new.property_id,
            user_id: new.user_id,
            start_date: new.start_date,
            end_date: new.end_date,
            status: new.status,
        };
        {
            let mut state = self.state.write();
            state.reservations.insert(id, reservation.clone());
            state.version += 1;
        }
        self.notify(&reservation.property_id);
        Ok(reservation)
    }

    pub fn get(&self, id: ReservationId) -> Option<Reservation> {
        self.state.read().reservations.get(&id).cloned()
    }

    /// Apply `change` to the stored reservation and notify its subscribers.
    pub fn update(
        &self,
        id: ReservationId,
        change: impl FnOnce(&mut Reservation) -> Result<()>,
    ) -> Result<Reservation> {
        let updated = {
            let mut state = self.state.write();
            let reservation = state
                .reservations
                .get_mut(&id)
                .ok_or(StayError::NotFound(id))?;
            change(reservation)?;
            let updated = reservation.clone();
            state.version += 1;
            updated
        };
        self.notify(&updated.property_id);
        Ok(updated)
    }

    /// Every stored reservation, ordered by id.
    pub fn all(&self) -> Vec<Reservation> {
        self.state.read().reservations.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(state: &State, property_id: &str) -> Vec<Reservation> {
        state
            .reservations
            .values()
            .filter(|r| r.property_id == property_id)
            .cloned()
            .collect()
    }

    // The state lock is released before listeners run so they may call back
    // into the store. Lock order is always dispatch, then state.
    fn notify(&self, property_id: &str) {
        let _dispatch = self.dispatch.lock();
        let (version, snapshot, subscribers): (u64, Vec<Reservation>, Vec<Arc<Subscriber>>) = {
            let state = self.state.read();
            let subscribers = state
                .subscribers
                .values()
                .filter(|s| s.property_id == property_id)
                .map(Arc::clone)
                .collect();
            (state.version, Self::snapshot(&state, property_id), subscribers)
        };
        for subscriber in subscribers {
            // A nested write from inside a listener may already have delivered
            // something newer.
            if subscriber.delivered.fetch_max(version, Ordering::AcqRel) >= version {
                continue;
            }
            (subscriber.listener)(snapshot.as_slice());
        }
    }
}

impl ReservationSource for InMemoryReservations {
    fn reservations_for(&self, property_id: &str) -> Result<Vec<Reservation>> {
        Ok(Self::snapshot(&self.state.read(), property_id))
    }
}

impl ReservationFeed for InMemoryReservations {
    fn subscribe(&self, property_id: &str, listener: Listener) -> Result<SubscriptionId> {
        if property_id.is_empty() {
            return Err(StayError::EmptyPropertyId);
        }
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        let _dispatch = self.dispatch.lock();
        let snapshot = {
            let mut state = self.state.write();
            let subscriber = Subscriber {
                property_id: property_id.to_string(),
                listener: Arc::clone(&listener),
                delivered: AtomicU64::new(state.version),
            };
            state.subscribers.insert(id, Arc::new(subscriber));
            Self::snapshot(&state, property_id)
        };
        listener(snapshot.as_slice());
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state.write().subscribers.remove(&id).is_some()
    }
}

/// Re-run the checker for `candidate` every time the property's snapshot changes.
///
/// The callback fires once immediately with the current snapshot. Results are
/// delivered in store order; the latest one is the current answer.
pub fn watch_availability<F, C>(
    feed: &F,
    checker: Arc<AvailabilityChecker<C>>,
    property_id: &str,
    candidate: CandidateRange,
    on_result: impl Fn(AvailabilityResult) + Send + Sync + 'static,
) -> Result<SubscriptionId>
where
    F: ReservationFeed + ?Sized,
    C: Clock + 'static,
{
    if property_id.is_empty() {
        return Err(StayError::EmptyPropertyId);
    }
    let owned_id = property_id.to_string();
    let listener: Listener = Arc::new(move |snapshot: &[Reservation]| {
        match checker.check_range(&owned_id, &candidate, snapshot) {
            Ok(result) => on_result(result),
            Err(err) => tracing::warn!(%err, "availability re-check failed"),
        }
    });
    feed.subscribe(property_id, listener)
}
