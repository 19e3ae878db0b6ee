//! Chat entity - One-to-one conversation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Chat {
    pub chat_id: i64,
    // always participant_a < participant_b, the pair is unique
    pub participant_a: i64,
    pub participant_b: i64,
    pub order_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    /// Canonical ordering of a participant pair
    pub fn ordered_pair(first: i64, second: i64) -> (i64, i64) {
        if first < second {
            (first, second)
        } else {
            (second, first)
        }
    }

    pub fn has_participant(&self, user_id: i64) -> bool {
        self.participant_a == user_id || self.participant_b == user_id
    }

    pub fn counterpart_of(&self, user_id: i64) -> i64 {
        if self.participant_a == user_id {
            self.participant_b
        } else {
            self.participant_a
        }
    }
}
