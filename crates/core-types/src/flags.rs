use serde::{Deserialize, Serialize};

/// Whether a true flag value is good, bad or indifferent for compliance.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Outlook {
    Positive,
    Negative,
    Neutral,
}

/// Evaluated value of a compliance flag.
///
/// A flag whose inputs are missing is reported as `NotEvaluable` with the
/// cause, never defaulted to a misleading boolean.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum FlagValue {
    Bool(bool),
    NotEvaluable(String),
}

/// One derived compliance indicator. Recomputed deterministically from
/// snapshots; never hand-set.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ComplianceFlag {
    pub id: String,
    pub value: FlagValue,
    pub outlook: Outlook,
    pub meaning: String,
}

impl ComplianceFlag {
    pub fn evaluated(
        id: impl Into<String>,
        value: bool,
        outlook: Outlook,
        meaning: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            value: FlagValue::Bool(value),
            outlook,
            meaning: meaning.into(),
        }
    }

    pub fn not_evaluable(
        id: impl Into<String>,
        cause: impl Into<String>,
        meaning: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            value: FlagValue::NotEvaluable(cause.into()),
            outlook: Outlook::Neutral,
            meaning: meaning.into(),
        }
    }
}
