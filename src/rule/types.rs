use thiserror::Error;

/// Fréquence de répétition (pas de granularité infra-journalière).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }
}

impl From<Frequency> for rrule::Frequency {
    fn from(freq: Frequency) -> Self {
        match freq {
            Frequency::Daily => Self::Daily,
            Frequency::Weekly => Self::Weekly,
            Frequency::Monthly => Self::Monthly,
            Frequency::Yearly => Self::Yearly,
        }
    }
}

impl TryFrom<rrule::Frequency> for Frequency {
    type Error = RuleError;

    fn try_from(freq: rrule::Frequency) -> Result<Self, Self::Error> {
        match freq {
            rrule::Frequency::Daily => Ok(Self::Daily),
            rrule::Frequency::Weekly => Ok(Self::Weekly),
            rrule::Frequency::Monthly => Ok(Self::Monthly),
            rrule::Frequency::Yearly => Ok(Self::Yearly),
            other => Err(RuleError::Syntax(format!("unsupported FREQ={other}"))),
        }
    }
}

/// Sens de parcours des occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("invalid recurrence rule: {0}")]
    Syntax(String),
    #[error("only a single RRULE line is supported")]
    MultipleRules,
    #[error("unsupported recurrence key: {0}")]
    UnsupportedKey(String),
    #[error("recurrence rule is unbounded (neither COUNT nor UNTIL is set)")]
    Unbounded,
    #[error("invalid recurrence rule: {0}")]
    Invalid(&'static str),
    #[error("recurrence rule rejected: {0}")]
    Rejected(String),
}
