// Audio module - track detection, duration probing and metadata sidecars

pub mod detection;
pub mod metadata;
pub mod metadata_writer;
pub mod probe;

pub use detection::{is_track_file, DEFAULT_EXTENSIONS};
pub use metadata::AudiobookMetadata;
pub use metadata_writer::write_sidecar;
pub use probe::{probe_track, DurationProbe, FfprobeProbe, NativeProbe, ProbeError, FALLBACK_DURATION_SECS};
