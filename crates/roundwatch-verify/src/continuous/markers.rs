//! Continuous marker-file checks

use super::{single, ContinuousAssert, Observable};
use crate::markers::{check_marker_files, ForbiddenMarkers};
use roundwatch_core::{IssType, MarkerFile, MarkerFilesObservation};

impl<S> ContinuousAssert<S>
where
    S: ?Sized + Observable<MarkerFilesObservation>,
{
    fn forbid_markers(self, assertion: &'static str, forbidden: ForbiddenMarkers) -> Self {
        self.register(assertion, move |observation: &MarkerFilesObservation, _shared| {
            single(check_marker_files(observation.node, &observation.status, forbidden))
        })
    }

    /// Fail when any marker file is written.
    pub fn have_no_marker_files(self) -> Self {
        self.forbid_markers("no marker files", ForbiddenMarkers::Any)
    }

    /// Fail when a coin round marker file is written.
    pub fn have_no_coin_round_marker_files(self) -> Self {
        self.forbid_markers(
            "no coin round marker files",
            ForbiddenMarkers::Only(MarkerFile::CoinRound),
        )
    }

    /// Fail when a no-super-majority marker file is written.
    pub fn have_no_no_super_majority_marker_files(self) -> Self {
        self.forbid_markers(
            "no no-super-majority marker files",
            ForbiddenMarkers::Only(MarkerFile::NoSuperMajority),
        )
    }

    /// Fail when a no-judges marker file is written.
    pub fn have_no_no_judges_marker_files(self) -> Self {
        self.forbid_markers(
            "no no-judges marker files",
            ForbiddenMarkers::Only(MarkerFile::NoJudges),
        )
    }

    /// Fail when a consensus exception marker file is written.
    pub fn have_no_consensus_exception_marker_files(self) -> Self {
        self.forbid_markers(
            "no consensus exception marker files",
            ForbiddenMarkers::Only(MarkerFile::ConsensusException),
        )
    }

    /// Fail when an ISS marker file of any type is written.
    pub fn have_no_iss_marker_files(self) -> Self {
        self.forbid_markers("no ISS marker files", ForbiddenMarkers::AnyIss)
    }

    /// Fail when an ISS marker file of type `iss` is written.
    pub fn have_no_iss_marker_files_of_type(self, iss: IssType) -> Self {
        self.forbid_markers("no ISS marker files of type", ForbiddenMarkers::iss(iss))
    }
}
