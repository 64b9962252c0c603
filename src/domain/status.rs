use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The only two condition types any reconciler writes, per `spec.md` §4.1:
/// "update the root's `status.conditions` with either `Accepted(ok-message)`
/// or `NotAccepted(error-message)`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionType {
    Accepted,
    NotAccepted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub kind: ConditionType,
    pub message: String,
    pub observed_at: DateTime<Utc>,
}

/// Status sub-resource shared by every root kind. Intentionally a single
/// condition rather than a list-of-conditions-by-type: the framework
/// contract only ever needs "what did the last reconcile conclude".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Status {
    pub conditions: Vec<Condition>,
}

impl Status {
    pub fn accepted(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.conditions = vec![Condition {
            kind: ConditionType::Accepted,
            message: message.into(),
            observed_at: now,
        }];
    }

    pub fn not_accepted(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.conditions = vec![Condition {
            kind: ConditionType::NotAccepted,
            message: message.into(),
            observed_at: now,
        }];
    }

    pub fn is_accepted(&self) -> bool {
        matches!(
            self.conditions.last(),
            Some(Condition {
                kind: ConditionType::Accepted,
                ..
            })
        )
    }
}
