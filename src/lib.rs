pub mod config;
pub mod handoff;
pub mod recording;
pub mod session;
pub mod store;

pub use config::Config;
pub use handoff::{HandoffError, HandoffPipeline, RecordingConsumer};
pub use recording::{
    FfprobeProbe, MediaInfo, MediaProbe, Recording, RecordingLocator, ResolveError,
};
pub use session::{
    SessionCoordinator, SessionPhase, StateSnapshot, StreamQuality, PAIRING_CODE_PLACEHOLDER,
};
pub use store::{FileStore, MemoryStore, SharedStateStore, StateValue};
