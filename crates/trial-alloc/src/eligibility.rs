use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Answers to the inclusion and exclusion questions for one candidate.
///
/// `None` means the question was left unanswered. Unanswered questions never
/// admit a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityAnswers {
    /// Candidate is 18 years or older.
    #[serde(default)]
    pub is_adult: Option<bool>,
    /// Candidate received a deceased donor transplant.
    #[serde(default)]
    pub is_deceased_donor_transplant: Option<bool>,
    /// Exclusion criterion name mapped to whether it applies.
    #[serde(default)]
    pub exclusion_flags: BTreeMap<String, Option<bool>>,
}

impl EligibilityAnswers {
    /// Both inclusion criteria answered yes and no exclusion flags set.
    pub fn admissible() -> Self {
        Self {
            is_adult: Some(true),
            is_deceased_donor_transplant: Some(true),
            exclusion_flags: BTreeMap::new(),
        }
    }

    /// Records the answer to an exclusion criterion.
    pub fn with_exclusion(mut self, criterion: impl Into<String>, applies: bool) -> Self {
        self.exclusion_flags.insert(criterion.into(), Some(applies));
        self
    }
}

/// Why a candidate was turned away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "criterion", rename_all = "kebab-case")]
pub enum RejectionReason {
    /// An inclusion criterion was answered no.
    InclusionNotMet(String),
    /// An inclusion criterion was left unanswered.
    InclusionUnanswered(String),
    /// An exclusion criterion applies.
    Excluded(String),
    /// An exclusion criterion was left unanswered.
    ExclusionUnanswered(String),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::InclusionNotMet(name) => write!(f, "inclusion not met: {name}"),
            RejectionReason::InclusionUnanswered(name) => write!(f, "unanswered: {name}"),
            RejectionReason::Excluded(name) => write!(f, "excluded: {name}"),
            RejectionReason::ExclusionUnanswered(name) => write!(f, "unanswered: {name}"),
        }
    }
}

/// Outcome of evaluating a set of answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reasons", rename_all = "kebab-case")]
pub enum Admission {
    /// Every criterion passed.
    Admit,
    /// At least one criterion failed, listed in evaluation order.
    Reject(Vec<RejectionReason>),
}

impl Admission {
    /// Returns `true` for [`Admission::Admit`].
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admit)
    }
}

/// Stateless inclusion/exclusion check run before allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilityGate {
    required_exclusions: Vec<String>,
}

impl EligibilityGate {
    /// Creates a gate that also demands an answer for each named exclusion.
    pub fn new<I, S>(required_exclusions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_exclusions: required_exclusions.into_iter().map(Into::into).collect(),
        }
    }

    /// Admits only when both inclusion criteria are `true` and no exclusion
    /// criterion is `true` or unanswered.
    pub fn evaluate(&self, answers: &EligibilityAnswers) -> Admission {
        let mut reasons = Vec::new();
        for (name, answer) in [
            ("is_adult", answers.is_adult),
            (
                "is_deceased_donor_transplant",
                answers.is_deceased_donor_transplant,
            ),
        ] {
            match answer {
                Some(true) => {}
                Some(false) => reasons.push(RejectionReason::InclusionNotMet(name.to_string())),
                None => reasons.push(RejectionReason::InclusionUnanswered(name.to_string())),
            }
        }
        for (name, flag) in &answers.exclusion_flags {
            match flag {
                Some(false) => {}
                Some(true) => reasons.push(RejectionReason::Excluded(name.clone())),
                None => reasons.push(RejectionReason::ExclusionUnanswered(name.clone())),
            }
        }
        for name in &self.required_exclusions {
            if !answers.exclusion_flags.contains_key(name) {
                reasons.push(RejectionReason::ExclusionUnanswered(name.clone()));
            }
        }
        if reasons.is_empty() {
            Admission::Admit
        } else {
            Admission::Reject(reasons)
        }
    }
}
