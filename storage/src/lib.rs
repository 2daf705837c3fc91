pub mod host;
pub mod volume;

pub use host::{HostProfile, OsFamily, QuoteStyle};
pub use volume::{guess_remote_base, list_volumes, VolumeCandidate, VolumePolicy};
