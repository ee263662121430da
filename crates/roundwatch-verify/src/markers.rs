//! Marker-file checks

use crate::violation::Violation;
use roundwatch_core::{IssType, MarkerFile, MarkerFilesStatus, NodeId};
use std::fmt;

/// Which marker files a check forbids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForbiddenMarkers {
    /// Every marker file
    Any,
    /// Every ISS marker, whatever its type
    AnyIss,
    /// One specific marker
    Only(MarkerFile),
}

impl ForbiddenMarkers {
    /// Forbid ISS markers of one type
    pub fn iss(iss: IssType) -> Self {
        ForbiddenMarkers::Only(MarkerFile::Iss(iss))
    }

    /// First forbidden marker present in `status`
    pub fn first_present(self, status: &MarkerFilesStatus) -> Option<MarkerFile> {
        status.present().into_iter().find(|marker| match self {
            ForbiddenMarkers::Any => true,
            ForbiddenMarkers::AnyIss => matches!(marker, MarkerFile::Iss(_)),
            ForbiddenMarkers::Only(only) => *marker == only,
        })
    }
}

impl fmt::Display for ForbiddenMarkers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForbiddenMarkers::Any => f.write_str("any marker file"),
            ForbiddenMarkers::AnyIss => f.write_str("any ISS marker file"),
            ForbiddenMarkers::Only(marker) => write!(f, "{marker} marker file"),
        }
    }
}

/// Fail if `status` contains a forbidden marker.
pub fn check_marker_files(
    node: NodeId,
    status: &MarkerFilesStatus,
    forbidden: ForbiddenMarkers,
) -> Result<(), Violation> {
    match forbidden.first_present(status) {
        Some(marker) => Err(Violation::MarkerFilePresent {
            node,
            marker,
            status: status.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selective_checks() {
        let mut status = MarkerFilesStatus {
            coin_round_marker: true,
            ..MarkerFilesStatus::default()
        };
        status.iss_markers.insert(IssType::SelfIss);

        assert!(check_marker_files(NodeId(1), &status, ForbiddenMarkers::Only(MarkerFile::NoJudges)).is_ok());
        assert!(check_marker_files(NodeId(1), &status, ForbiddenMarkers::iss(IssType::OtherIss)).is_ok());

        let violation = check_marker_files(NodeId(1), &status, ForbiddenMarkers::AnyIss).unwrap_err();
        assert_eq!(
            violation,
            Violation::MarkerFilePresent {
                node: NodeId(1),
                marker: MarkerFile::Iss(IssType::SelfIss),
                status: "[coin-round, iss-SELF_ISS]".to_string(),
            }
        );

        let violation = check_marker_files(NodeId(1), &status, ForbiddenMarkers::Any).unwrap_err();
        assert!(violation.to_string().contains("wrote marker file coin-round"));
    }

    #[test]
    fn test_clean_status_passes_everything() {
        let status = MarkerFilesStatus::default();
        assert!(check_marker_files(NodeId(1), &status, ForbiddenMarkers::Any).is_ok());
    }
}
