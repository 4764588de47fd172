mod locator;
mod probe;

pub use locator::{Recording, RecordingLocator, ResolveError, DEFAULT_MIN_RECORDING_BYTES};
pub use probe::{FfprobeProbe, MediaInfo, MediaProbe};
