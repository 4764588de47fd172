mod coordinator;
mod snapshot;

pub use coordinator::SessionCoordinator;
pub use snapshot::{SessionPhase, StateSnapshot, StreamQuality, PAIRING_CODE_PLACEHOLDER};
