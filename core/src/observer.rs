//! Change notifications — the presentation boundary.
//!
//! An explicit observer registry keyed by change kind; no hidden
//! global broadcast. Dispatch is synchronous and runs in
//! subscriber-registration order. A panicking subscriber is caught,
//! logged, and never blocks delivery to the rest or fails the mutation
//! that triggered it.

use crate::{
    economic_event::EconomicEvent,
    state::{CargoStack, PriceKnowledge},
    types::{Credits, Day, SystemId},
};
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Which named channel a subscriber listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Credits,
    Debt,
    Fuel,
    Cargo,
    Location,
    Time,
    PriceKnowledge,
    ActiveEvents,
}

/// A change notification carrying the new value as payload.
#[derive(Debug, Clone)]
pub enum ChangeEvent {
    CreditsChanged(Credits),
    DebtChanged(Credits),
    FuelChanged(f64),
    CargoChanged(Vec<CargoStack>),
    LocationChanged(SystemId),
    TimeChanged(Day),
    PriceKnowledgeChanged(BTreeMap<SystemId, PriceKnowledge>),
    ActiveEventsChanged(Vec<EconomicEvent>),
}

impl ChangeEvent {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::CreditsChanged(_) => ChangeKind::Credits,
            Self::DebtChanged(_) => ChangeKind::Debt,
            Self::FuelChanged(_) => ChangeKind::Fuel,
            Self::CargoChanged(_) => ChangeKind::Cargo,
            Self::LocationChanged(_) => ChangeKind::Location,
            Self::TimeChanged(_) => ChangeKind::Time,
            Self::PriceKnowledgeChanged(_) => ChangeKind::PriceKnowledge,
            Self::ActiveEventsChanged(_) => ChangeKind::ActiveEvents,
        }
    }
}

pub type SubscriberId = u64;

type Callback = Box<dyn FnMut(&ChangeEvent)>;

#[derive(Default)]
pub struct ObserverRegistry {
    next_id: SubscriberId,
    // Vec, not a map: dispatch order is registration order.
    subscribers: Vec<(SubscriberId, ChangeKind, Callback)>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: ChangeKind, callback: Callback) -> SubscriberId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, kind, callback));
        id
    }

    /// Returns true if a subscriber with this id existed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Deliver to every matching subscriber, isolating failures.
    pub fn notify(&mut self, event: &ChangeEvent) {
        let kind = event.kind();
        for (id, sub_kind, callback) in &mut self.subscribers {
            if *sub_kind != kind {
                continue;
            }
            let outcome = catch_unwind(AssertUnwindSafe(|| callback(event)));
            if outcome.is_err() {
                log::warn!("observer: subscriber {id} panicked on {kind:?}; delivery continues");
            }
        }
    }
}
