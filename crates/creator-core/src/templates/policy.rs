//! Collision policy for destination files that already exist

use super::manifest::Classification;
use crate::error::{CreatorError, Result};

/// Overwrite choices made by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionFlags {
    /// Deprecated synonym for `overwrite`
    pub force: bool,
    pub overwrite: bool,
    pub no_overwrite: bool,
}

impl CollisionFlags {
    /// Reject contradictory flag combinations before anything is written
    pub fn validate(&self) -> Result<()> {
        if self.overwrite && self.no_overwrite {
            return Err(CreatorError::ConflictingFlags);
        }
        Ok(())
    }
}

/// Outcome for one destination file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Write,
    Skip,
    Reject,
}

/// Decide what happens to a destination file
pub fn decide(classification: Classification, exists: bool, flags: &CollisionFlags) -> Decision {
    if !exists {
        return Decision::Write;
    }
    match classification {
        Classification::AlwaysRefresh => Decision::Write,
        Classification::Protect if flags.force || flags.overwrite => Decision::Write,
        Classification::Protect if flags.no_overwrite => Decision::Skip,
        Classification::Protect => Decision::Reject,
    }
}
