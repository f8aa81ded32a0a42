pub mod config;
pub mod engine;
pub mod model;
pub mod observability;

pub use config::PolicyConfig;
pub use engine::{BookingRequest, Decision, Engine, EngineError, RejectReason};
pub use model::{
    Reservation, ReservationStatus, SeatingPreference, Table, Zone,
};
