use crate::model::{ReservationId, TableId};

/// Faults surfaced by the engine facade. Business rejections are not
/// errors — they come back as `Decision::Reject` values. None of these
/// messages are meant for end users.
#[derive(Debug)]
pub enum EngineError {
    ReservationNotFound(ReservationId),
    TableNotFound(TableId),
    TableInactive(TableId),
    /// Assignment requested for a table blocked by an overlapping booking.
    TableInUse(TableId),
    InvalidConfig(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::ReservationNotFound(id) => write!(f, "reservation not found: {id}"),
            EngineError::TableNotFound(id) => write!(f, "table not found: {id}"),
            EngineError::TableInactive(id) => write!(f, "table is inactive: {id}"),
            EngineError::TableInUse(id) => {
                write!(f, "table {id} is already in use for an overlapping booking")
            }
            EngineError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
