//! Command implementations.

pub mod coordinated;
pub mod ingest;
pub mod seed;
pub mod trace;
pub mod verify;

pub use self::coordinated::execute_coordinated;
pub use self::ingest::execute_ingest;
pub use self::seed::{execute_seed_corpus, execute_seed_graph};
pub use self::trace::{execute_patient_zero, execute_trace};
pub use self::verify::execute_verify;
