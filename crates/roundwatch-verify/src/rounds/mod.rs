//! Consensus round checks
//!
//! - **validation**: internal consistency of one node's rounds
//! - **agreement**: cross-node equality of overlapping round histories
//! - **diff**: readable round differences used by agreement failures

pub mod agreement;
pub mod diff;
pub mod validation;

pub use agreement::{
    check_against_reference, check_equal_rounds, select_reference, RoundAgreement,
};
pub use diff::diff_rounds;
pub use validation::{
    check_advanced_since, check_birth_round_split, check_event_ordering, check_last_round_num,
    check_round_pair, check_rounds, RoundValidator,
};
