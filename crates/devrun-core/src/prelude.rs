//! Prelude for common imports used throughout all devrun crates

pub use crate::error::{Error, ErrorKind, Result};
pub use tracing::{debug, error, info, instrument, trace, warn};
