//! Depot: the fleet available to a planning day.

use serde::{Deserialize, Serialize};

use crate::domain::truck::Truck;

/// The depot owns the day's fleet and hands trucks to the orchestrator in ascending
/// id order, the iteration order the placement rules rely on for determinism.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Depot {
    /// Depot identifier.
    pub depot_id: String,
    /// Trucks available to this planning day, keyed implicitly by `Truck::spec.id`.
    pub trucks: Vec<Truck>,
}

impl Depot {
    /// Build a depot from its identifier and fleet, sorting trucks by ascending id so
    /// every downstream ascending-id iteration only has to trust insertion order.
    pub fn new(depot_id: impl Into<String>, mut trucks: Vec<Truck>) -> Self {
        trucks.sort_by(|a, b| a.spec.id.cmp(&b.spec.id));
        Self {
            depot_id: depot_id.into(),
            trucks,
        }
    }

    /// Trucks that have been opened but not yet departed, in ascending id order.
    pub fn open_trucks(&self) -> impl Iterator<Item = &Truck> {
        self.trucks.iter().filter(|t| t.opened && !t.departed)
    }

    /// Trucks never opened, in ascending id order — candidates for "open a new truck".
    pub fn unopened_trucks(&self) -> impl Iterator<Item = &Truck> {
        self.trucks.iter().filter(|t| !t.opened)
    }

    /// Mutable lookup by truck id.
    pub fn truck_mut(&mut self, id: &str) -> Option<&mut Truck> {
        self.trucks.iter_mut().find(|t| t.spec.id == id)
    }

    /// Immutable lookup by truck id.
    pub fn truck(&self, id: &str) -> Option<&Truck> {
        self.trucks.iter().find(|t| t.spec.id == id)
    }
}
