//! Domain model: items, customers, orders, trucks, depot.

mod customer;
mod depot;
mod item;
mod order;
mod truck;

pub use customer::Customer;
pub use depot::Depot;
pub use item::{Fragility, Item, SeparationTag};
pub use order::{CustomerOrder, OrderLine};
pub use truck::Truck;

pub use crate::config::{TruckSpec, TruckType};
