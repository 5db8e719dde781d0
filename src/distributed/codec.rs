//! Versioned wire record for solution candidates
//!
//! A record is a JSON object carrying an explicit `version`:
//!
//! ```text
//! {"version":1,"rank":2,"found":true,"moves":[5,258]}
//! ```
//!
//! States never cross the wire. Every rank holds the initial state, so the
//! receiver rebuilds a reached state by replaying the move ids.

use crate::error::CodecError;
use serde::{Deserialize, Serialize};

/// Current record version.
pub const RECORD_VERSION: u8 = 1;

/// A candidate as sent between ranks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub version: u8,
    pub rank: u32,
    pub found: bool,
    pub moves: Vec<u32>,
}

/// Just enough of a record to check its version before trusting the rest.
#[derive(Deserialize)]
struct VersionTag {
    version: u8,
}

impl CandidateRecord {
    pub fn not_found(rank: u32) -> Self {
        Self {
            version: RECORD_VERSION,
            rank,
            found: false,
            moves: Vec::new(),
        }
    }

    pub fn found(rank: u32, moves: Vec<u32>) -> Self {
        Self {
            version: RECORD_VERSION,
            rank,
            found: true,
            moves,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        self.validate()?;
        serde_json::to_vec(self).map_err(|e| CodecError::Malformed(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let tag: VersionTag =
            serde_json::from_slice(bytes).map_err(|e| CodecError::Malformed(e.to_string()))?;
        if tag.version != RECORD_VERSION {
            return Err(CodecError::UnsupportedVersion(tag.version));
        }
        let record: Self =
            serde_json::from_slice(bytes).map_err(|e| CodecError::Malformed(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }

    fn validate(&self) -> Result<(), CodecError> {
        if self.version != RECORD_VERSION {
            return Err(CodecError::UnsupportedVersion(self.version));
        }
        if !self.found && !self.moves.is_empty() {
            return Err(CodecError::PathWithoutSolution(self.moves.len()));
        }
        Ok(())
    }
}
