//! Marker files written by nodes on anomalous protocol conditions

use crate::identifiers::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of invalid-state-signature detected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IssType {
    /// This node disagrees with the network
    SelfIss,
    /// Another node disagrees with the network
    OtherIss,
    /// No supermajority agrees on the state
    CatastrophicIss,
}

impl fmt::Display for IssType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssType::SelfIss => f.write_str("SELF_ISS"),
            IssType::OtherIss => f.write_str("OTHER_ISS"),
            IssType::CatastrophicIss => f.write_str("CATASTROPHIC_ISS"),
        }
    }
}

/// A single marker file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerFile {
    /// Consensus needed a coin round
    CoinRound,
    /// A round was decided without a supermajority
    NoSuperMajority,
    /// A round had no judges
    NoJudges,
    /// Consensus raised an exception
    ConsensusException,
    /// An ISS of the given type was detected
    Iss(IssType),
}

impl fmt::Display for MarkerFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerFile::CoinRound => f.write_str("coin-round"),
            MarkerFile::NoSuperMajority => f.write_str("no-super-majority"),
            MarkerFile::NoJudges => f.write_str("no-judges"),
            MarkerFile::ConsensusException => f.write_str("consensus-exception"),
            MarkerFile::Iss(iss) => write!(f, "iss-{iss}"),
        }
    }
}

/// Snapshot of the marker files present on one node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarkerFilesStatus {
    /// Coin-round marker present
    pub coin_round_marker: bool,
    /// No-super-majority marker present
    pub no_super_majority_marker: bool,
    /// No-judges marker present
    pub no_judges_marker: bool,
    /// Consensus-exception marker present
    pub consensus_exception_marker: bool,
    /// ISS markers present, by type
    pub iss_markers: BTreeSet<IssType>,
}

impl MarkerFilesStatus {
    /// Whether any marker file at all is present
    pub fn has_any_marker_file(&self) -> bool {
        self.coin_round_marker
            || self.no_super_majority_marker
            || self.no_judges_marker
            || self.consensus_exception_marker
            || self.has_any_iss_marker()
    }

    /// Whether any ISS marker is present
    pub fn has_any_iss_marker(&self) -> bool {
        !self.iss_markers.is_empty()
    }

    /// Whether an ISS marker of the given type is present
    pub fn has_iss_marker_of(&self, iss: IssType) -> bool {
        self.iss_markers.contains(&iss)
    }

    /// Whether the given marker file is present
    pub fn has(&self, marker: MarkerFile) -> bool {
        match marker {
            MarkerFile::CoinRound => self.coin_round_marker,
            MarkerFile::NoSuperMajority => self.no_super_majority_marker,
            MarkerFile::NoJudges => self.no_judges_marker,
            MarkerFile::ConsensusException => self.consensus_exception_marker,
            MarkerFile::Iss(iss) => self.has_iss_marker_of(iss),
        }
    }

    /// All markers present, in a stable order
    pub fn present(&self) -> Vec<MarkerFile> {
        let mut present = Vec::new();
        if self.coin_round_marker {
            present.push(MarkerFile::CoinRound);
        }
        if self.no_super_majority_marker {
            present.push(MarkerFile::NoSuperMajority);
        }
        if self.no_judges_marker {
            present.push(MarkerFile::NoJudges);
        }
        if self.consensus_exception_marker {
            present.push(MarkerFile::ConsensusException);
        }
        present.extend(self.iss_markers.iter().copied().map(MarkerFile::Iss));
        present
    }
}

impl fmt::Display for MarkerFilesStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present = self.present();
        if present.is_empty() {
            return f.write_str("[]");
        }
        let names: Vec<String> = present.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Marker-file snapshot reported by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerFilesObservation {
    /// Reporting node
    pub node: NodeId,
    /// Markers present on that node
    pub status: MarkerFilesStatus,
}

impl MarkerFilesObservation {
    /// Create an observation
    pub fn new(node: NodeId, status: MarkerFilesStatus) -> Self {
        Self { node, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_status_has_no_markers() {
        let status = MarkerFilesStatus::default();
        assert!(!status.has_any_marker_file());
        assert!(status.present().is_empty());
        assert_eq!(status.to_string(), "[]");
    }

    #[test]
    fn test_iss_marker_counts_as_marker_file() {
        let mut status = MarkerFilesStatus::default();
        status.iss_markers.insert(IssType::OtherIss);
        assert!(status.has_any_marker_file());
        assert!(status.has(MarkerFile::Iss(IssType::OtherIss)));
        assert!(!status.has(MarkerFile::Iss(IssType::SelfIss)));
        assert_eq!(status.to_string(), "[iss-OTHER_ISS]");
    }
}
