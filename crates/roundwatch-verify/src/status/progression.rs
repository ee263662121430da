//! Platform status progression matching
//!
//! An expected progression is an ordered list of steps. Each step names a
//! target status plus the interim statuses that may appear before it:
//! required ones must all be seen, optional ones are tolerated.
//!
//! Matching is a single left-to-right pass without backtracking. A status is
//! only ever matched against the current step, even when it would also
//! satisfy a later one.

use crate::violation::{render_list, ProgressionError, Violation};
use roundwatch_core::{NodeId, PlatformStatus, RoundwatchError};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

/// Most recent statuses a matcher keeps for violation messages
pub const OBSERVED_WINDOW: usize = 32;

/// One expected step of a status progression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusProgressionStep {
    target: PlatformStatus,
    required_interim: BTreeSet<PlatformStatus>,
    optional_interim: BTreeSet<PlatformStatus>,
}

/// Start a step that ends when `status` is entered.
pub fn target(status: PlatformStatus) -> StatusProgressionStep {
    StatusProgressionStep::new(status)
}

impl StatusProgressionStep {
    /// Step with no interim statuses
    pub fn new(target: PlatformStatus) -> Self {
        Self {
            target,
            required_interim: BTreeSet::new(),
            optional_interim: BTreeSet::new(),
        }
    }

    /// Require every status in `statuses` before the target
    pub fn requiring_interim(mut self, statuses: impl IntoIterator<Item = PlatformStatus>) -> Self {
        self.required_interim.extend(statuses);
        self
    }

    /// Tolerate the statuses in `statuses` before the target
    pub fn optional_interim(mut self, statuses: impl IntoIterator<Item = PlatformStatus>) -> Self {
        self.optional_interim.extend(statuses);
        self
    }

    /// Target status
    pub fn target(&self) -> PlatformStatus {
        self.target
    }

    /// Required interim statuses
    pub fn required(&self) -> &BTreeSet<PlatformStatus> {
        &self.required_interim
    }

    /// Optional interim statuses
    pub fn optional(&self) -> &BTreeSet<PlatformStatus> {
        &self.optional_interim
    }

    fn allows_interim(&self, status: PlatformStatus) -> bool {
        self.required_interim.contains(&status) || self.optional_interim.contains(&status)
    }
}

impl fmt::Display for StatusProgressionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)?;
        if !self.required_interim.is_empty() {
            write!(f, " requiring {}", render_list(&self.required_interim))?;
        }
        if !self.optional_interim.is_empty() {
            write!(f, " allowing {}", render_list(&self.optional_interim))?;
        }
        Ok(())
    }
}

/// A validated, non-empty list of expected steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusProgression {
    steps: Vec<StatusProgressionStep>,
}

impl StatusProgression {
    /// Validate `steps`; at least one step is required.
    pub fn new(steps: Vec<StatusProgressionStep>) -> Result<Self, RoundwatchError> {
        if steps.is_empty() {
            return Err(RoundwatchError::precondition(
                "a status progression needs at least one step",
            ));
        }
        Ok(Self { steps })
    }

    /// Expected steps
    pub fn steps(&self) -> &[StatusProgressionStep] {
        &self.steps
    }

    /// Start matching the statuses of `node`
    pub fn matcher(&self, node: NodeId) -> ProgressionMatcher {
        ProgressionMatcher {
            node,
            steps: self.steps.clone(),
            index: 0,
            interim: BTreeSet::new(),
            observed: VecDeque::with_capacity(OBSERVED_WINDOW),
            observed_total: 0,
        }
    }

    /// Match a complete status sequence, stopping at the first violation.
    pub fn check(&self, node: NodeId, statuses: &[PlatformStatus]) -> Result<(), Violation> {
        let mut matcher = self.matcher(node);
        for status in statuses {
            matcher.observe(*status)?;
        }
        matcher.finish()
    }
}

impl fmt::Display for StatusProgression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_list(&self.steps))
    }
}

/// Incremental matcher for one node's status sequence.
#[derive(Debug, Clone)]
pub struct ProgressionMatcher {
    node: NodeId,
    steps: Vec<StatusProgressionStep>,
    index: usize,
    interim: BTreeSet<PlatformStatus>,
    observed: VecDeque<PlatformStatus>,
    observed_total: usize,
}

impl ProgressionMatcher {
    /// Node being matched
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Number of steps whose target has been reached
    pub fn matched_steps(&self) -> usize {
        self.index
    }

    /// Whether every step has been matched
    pub fn is_complete(&self) -> bool {
        self.index >= self.steps.len()
    }

    /// The last [`OBSERVED_WINDOW`] statuses, oldest first
    pub fn observed(&self) -> impl ExactSizeIterator<Item = PlatformStatus> + '_ {
        self.observed.iter().copied()
    }

    /// Number of statuses fed so far
    pub fn observed_total(&self) -> usize {
        self.observed_total
    }

    fn violation(&self, reason: ProgressionError) -> Violation {
        let mut observed = render_list(&self.observed);
        if self.observed_total > self.observed.len() {
            observed.push_str(&format!(
                " (last {} of {})",
                self.observed.len(),
                self.observed_total
            ));
        }
        Violation::StatusProgression {
            node: self.node,
            reason,
            observed,
        }
    }

    /// Feed the next observed status.
    pub fn observe(&mut self, status: PlatformStatus) -> Result<(), Violation> {
        if self.observed.len() == OBSERVED_WINDOW {
            self.observed.pop_front();
        }
        self.observed.push_back(status);
        self.observed_total += 1;

        let Some(step) = self.steps.get(self.index) else {
            return Err(self.violation(ProgressionError::MoreStatusesThanExpected {
                steps: self.steps.len(),
                status,
            }));
        };

        if status == step.target {
            let missing: Vec<PlatformStatus> = step
                .required_interim
                .difference(&self.interim)
                .copied()
                .collect();
            let step_index = self.index;
            let target = step.target;
            self.interim.clear();
            self.index += 1;
            if !missing.is_empty() {
                return Err(self.violation(ProgressionError::MissingRequiredInterim {
                    step: step_index,
                    target,
                    missing,
                }));
            }
            return Ok(());
        }

        if step.allows_interim(status) {
            self.interim.insert(status);
            return Ok(());
        }

        let reason = ProgressionError::UnexpectedStatus {
            step: self.index,
            target: step.target,
            status,
        };
        Err(self.violation(reason))
    }

    /// Check that the sequence ended after the last step.
    pub fn finish(&self) -> Result<(), Violation> {
        if self.is_complete() {
            return Ok(());
        }
        Err(self.violation(ProgressionError::FewerStepsThanExpected {
            expected: self.steps.len(),
            matched: self.index,
        }))
    }
}
