use super::{ensure, ResultAssert};
use crate::markers::{check_marker_files, ForbiddenMarkers};
use crate::results::{MultiNodeMarkerFiles, NodeMarkerFiles};
use roundwatch_core::{IssType, MarkerFile};

impl ResultAssert<'_, dyn NodeMarkerFiles> {
    #[track_caller]
    fn forbid(self, forbidden: ForbiddenMarkers) -> Self {
        ensure(check_marker_files(
            self.subject.node_id(),
            &self.subject.status(),
            forbidden,
        ));
        self
    }

    /// No marker file was written
    #[track_caller]
    pub fn has_no_marker_files(self) -> Self {
        self.forbid(ForbiddenMarkers::Any)
    }

    /// No coin round marker file was written
    #[track_caller]
    pub fn has_no_coin_round_marker_file(self) -> Self {
        self.forbid(ForbiddenMarkers::Only(MarkerFile::CoinRound))
    }

    /// No no-super-majority marker file was written
    #[track_caller]
    pub fn has_no_no_super_majority_marker_file(self) -> Self {
        self.forbid(ForbiddenMarkers::Only(MarkerFile::NoSuperMajority))
    }

    /// No no-judges marker file was written
    #[track_caller]
    pub fn has_no_no_judges_marker_file(self) -> Self {
        self.forbid(ForbiddenMarkers::Only(MarkerFile::NoJudges))
    }

    /// No consensus exception marker file was written
    #[track_caller]
    pub fn has_no_consensus_exception_marker_file(self) -> Self {
        self.forbid(ForbiddenMarkers::Only(MarkerFile::ConsensusException))
    }

    /// No ISS marker file of any type was written
    #[track_caller]
    pub fn has_no_iss_marker_files(self) -> Self {
        self.forbid(ForbiddenMarkers::AnyIss)
    }

    /// No ISS marker file of type `iss` was written
    #[track_caller]
    pub fn has_no_iss_marker_file_of_type(self, iss: IssType) -> Self {
        self.forbid(ForbiddenMarkers::iss(iss))
    }
}

impl ResultAssert<'_, dyn MultiNodeMarkerFiles> {
    #[track_caller]
    fn forbid_everywhere(self, forbidden: ForbiddenMarkers) -> Self {
        for result in self.subject.results() {
            ensure(check_marker_files(result.node_id(), &result.status(), forbidden));
        }
        self
    }

    /// No node wrote a marker file
    #[track_caller]
    pub fn have_no_marker_files(self) -> Self {
        self.forbid_everywhere(ForbiddenMarkers::Any)
    }

    /// No node wrote a coin round marker file
    #[track_caller]
    pub fn have_no_coin_round_marker_files(self) -> Self {
        self.forbid_everywhere(ForbiddenMarkers::Only(MarkerFile::CoinRound))
    }

    /// No node wrote a no-super-majority marker file
    #[track_caller]
    pub fn have_no_no_super_majority_marker_files(self) -> Self {
        self.forbid_everywhere(ForbiddenMarkers::Only(MarkerFile::NoSuperMajority))
    }

    /// No node wrote a no-judges marker file
    #[track_caller]
    pub fn have_no_no_judges_marker_files(self) -> Self {
        self.forbid_everywhere(ForbiddenMarkers::Only(MarkerFile::NoJudges))
    }

    /// No node wrote a consensus exception marker file
    #[track_caller]
    pub fn have_no_consensus_exception_marker_files(self) -> Self {
        self.forbid_everywhere(ForbiddenMarkers::Only(MarkerFile::ConsensusException))
    }

    /// No node wrote an ISS marker file
    #[track_caller]
    pub fn have_no_iss_marker_files(self) -> Self {
        self.forbid_everywhere(ForbiddenMarkers::AnyIss)
    }

    /// No node wrote an ISS marker file of type `iss`
    #[track_caller]
    pub fn have_no_iss_marker_files_of_type(self, iss: IssType) -> Self {
        self.forbid_everywhere(ForbiddenMarkers::iss(iss))
    }
}
