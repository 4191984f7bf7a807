//! @ai:module:intent Phases of a benchmark run
//! @ai:module:layer domain
//! @ai:module:public_api Phase
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};

/// @ai:intent Where a benchmark run stands
/// @ai:invariant Mining → Ingesting → Aggregating → Recapping → Persisting → Done, Failed from anywhere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Mining,
    Ingesting,
    Aggregating,
    Recapping,
    Persisting,
    Done,
    Failed,
}

impl Phase {
    /// @ai:intent Convert phase to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Mining => "mining",
            Phase::Ingesting => "ingesting",
            Phase::Aggregating => "aggregating",
            Phase::Recapping => "recapping",
            Phase::Persisting => "persisting",
            Phase::Done => "done",
            Phase::Failed => "failed",
        }
    }

    /// @ai:intent Phase following this one on success
    /// @ai:effects pure
    pub fn next(&self) -> Phase {
        match self {
            Phase::Mining => Phase::Ingesting,
            Phase::Ingesting => Phase::Aggregating,
            Phase::Aggregating => Phase::Recapping,
            Phase::Recapping => Phase::Persisting,
            Phase::Persisting | Phase::Done => Phase::Done,
            Phase::Failed => Phase::Failed,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_run_in_order() {
        let mut phase = Phase::default();
        let mut visited = vec![phase];
        while phase != Phase::Done {
            phase = phase.next();
            visited.push(phase);
        }

        assert_eq!(
            visited,
            vec![
                Phase::Mining,
                Phase::Ingesting,
                Phase::Aggregating,
                Phase::Recapping,
                Phase::Persisting,
                Phase::Done,
            ]
        );
        assert_eq!(Phase::Failed.next(), Phase::Failed);
    }
}
