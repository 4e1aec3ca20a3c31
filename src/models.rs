//! Core data models for the dialogue router

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//
// ================= Enums =================
//

/// Speaker of a transcript turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Numeric fields of the user financial profile
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProfileField {
    Income,
    Expenses,
    Savings,
    Debt,
}

//
// ================= Turn =================
//

/// One exchange unit in the transcript. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub turn_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            turn_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            role,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }
}

//
// ================= Profile =================
//

/// User financial profile.
///
/// Numeric fields are opaque amounts: no currency, period, or range semantics
/// are attached. Later writes overwrite earlier values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFinancialProfile {
    pub income: Option<f64>,
    pub expenses: Option<f64>,
    pub savings: Option<f64>,
    pub debt: Option<f64>,
    pub goals: Vec<String>,
}

impl UserFinancialProfile {
    pub fn set(&mut self, field: ProfileField, value: f64) {
        match field {
            ProfileField::Income => self.income = Some(value),
            ProfileField::Expenses => self.expenses = Some(value),
            ProfileField::Savings => self.savings = Some(value),
            ProfileField::Debt => self.debt = Some(value),
        }
    }

    pub fn get(&self, field: ProfileField) -> Option<f64> {
        match field {
            ProfileField::Income => self.income,
            ProfileField::Expenses => self.expenses,
            ProfileField::Savings => self.savings,
            ProfileField::Debt => self.debt,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        write!(f, "{}", s)
    }
}
