//! Committee consensus rules.
//!
//! A round is decided once a quorum (strict majority of the full committee)
//! has voted. The outcome is the majority of the votes cast at that moment:
//! approval needs strictly more than half of the cast ballots, so a tie is a
//! rejection. Ballots arriving after the decision never change it.

use crate::enums::{ConsensusOutcome, VoteDecision};

/// Minimum number of ballots before a round is decided: `floor(total / 2) + 1`.
#[must_use]
pub const fn quorum(committee_size: usize) -> usize {
    committee_size / 2 + 1
}

/// Ballot counts for one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub cast: usize,
    pub approve: usize,
    pub reject: usize,
}

impl Tally {
    #[must_use]
    pub fn from_decisions<I>(decisions: I) -> Self
    where
        I: IntoIterator<Item = VoteDecision>,
    {
        decisions
            .into_iter()
            .fold(Self::default(), |mut tally, decision| {
                tally.cast += 1;
                match decision {
                    VoteDecision::Approve => tally.approve += 1,
                    VoteDecision::Reject => tally.reject += 1,
                }
                tally
            })
    }

    /// `approve * 100 / cast` with integer division, 0 when nothing was cast.
    #[must_use]
    pub const fn approval_percentage(&self) -> u32 {
        if self.cast == 0 {
            return 0;
        }
        #[allow(clippy::cast_possible_truncation)]
        let pct = (self.approve * 100 / self.cast) as u32;
        pct
    }

    /// Whether approvals are a strict majority of the ballots cast.
    #[must_use]
    pub const fn has_strict_majority(&self) -> bool {
        self.approve * 2 > self.cast
    }
}

/// Decide a round from the ballots cast so far.
///
/// Returns `None` while quorum has not been reached.
#[must_use]
pub fn evaluate(committee_size: usize, tally: &Tally) -> Option<ConsensusOutcome> {
    if tally.cast < quorum(committee_size) {
        return None;
    }
    if tally.has_strict_majority() {
        Some(ConsensusOutcome::Approved)
    } else {
        Some(ConsensusOutcome::Rejected)
    }
}

/// The outcome fixed when the round reached quorum.
///
/// `decisions` must be in cast order. Only the first `quorum` ballots count,
/// which is exactly the set the engine saw when it applied the decision.
#[must_use]
pub fn decided_outcome<I>(committee_size: usize, decisions: I) -> Option<ConsensusOutcome>
where
    I: IntoIterator<Item = VoteDecision>,
{
    let deciding = Tally::from_decisions(decisions.into_iter().take(quorum(committee_size)));
    evaluate(committee_size, &deciding)
}
