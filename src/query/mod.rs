pub mod engine;

pub use engine::{DEFAULT_MIN_COUNT, DEFAULT_TOP_LIMIT, QueryEngine};
