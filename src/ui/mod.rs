pub mod icons;
pub mod output;
pub mod progress;
pub mod table;

pub use icons::Icons;
pub use output::{error, header, info, notice, nothing_found, section, success, warn};
pub use progress::ingest_progress;
