//! Universe enumeration port trait.

use crate::domain::error::PapertraderError;

pub trait UniversePort {
    /// The tradable symbols for this cycle. Membership is dynamic: the
    /// universe is re-fetched every cycle.
    fn fetch_universe(&self) -> Result<Vec<String>, PapertraderError>;
}
