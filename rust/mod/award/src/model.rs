use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Longest accepted values, in characters.
pub const MAX_EMPLOYEE_ID_LEN: usize = 50;
pub const MAX_EMPLOYEE_NAME_LEN: usize = 200;
pub const MAX_DEPARTMENT_LEN: usize = 200;
pub const MAX_PRIZE_NAME_LEN: usize = 100;
pub const MAX_PRIZE_AMOUNT_LEN: usize = 100;

/// One eligible employee, as imported from the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// The code printed on the badge and scanned at the event.
    pub employee_id: String,
    pub name: String,
    pub department: String,
    /// 1-based position in the import, preserved for display.
    pub import_order: i64,
}

/// A roster row as submitted for import, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: String,
}

/// Body of `PUT /employees`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRequest {
    pub employees: Vec<NewEmployee>,
}

/// Counts reported after a roster replace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub added: u32,
    /// Rows whose id repeated an earlier row; the later row wins.
    pub updated: u32,
    /// Rows with a blank id or name.
    pub skipped: u32,
}

// ---------------------------------------------------------------------------
// Awards
// ---------------------------------------------------------------------------

/// One successful allocation. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeAward {
    pub id: i64,
    pub employee_id: String,
    pub prize_name: String,
    /// Display text copied from the catalog (or the caller) at award time.
    pub prize_amount: String,
    /// 1-based ordinal of this award within its prize.
    pub slot: i64,
    /// RFC 3339 UTC, microsecond precision.
    pub awarded_at: String,
}

/// Outcome of one award attempt.
///
/// Every rejection leaves the award table unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationResult {
    /// The award was committed; `new_count` includes it.
    #[serde(rename_all = "camelCase")]
    Success { new_count: u32, quota: u32 },

    /// The scanned code was empty or whitespace.
    EmptyCode,

    /// No employee with this code is on the roster.
    #[serde(rename_all = "camelCase")]
    EmployeeNotFound { code: String },

    /// Every slot of this prize has already been awarded.
    #[serde(rename_all = "camelCase")]
    QuotaExceeded {
        prize_name: String,
        quota: u32,
        current_count: u32,
    },

    /// The employee already holds a prize (one prize per person).
    #[serde(rename_all = "camelCase")]
    AlreadyWon { existing_prize_name: String },

    /// A storage constraint rejected the insert because another attempt
    /// committed first. Retrying once re-evaluates quota and prior wins.
    ConcurrentConflict,
}

impl AllocationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Human-readable message naming the prize, employee or limit involved.
    pub fn message(&self) -> String {
        match self {
            Self::Success { new_count, quota } => {
                format!("award recorded ({new_count}/{quota} awarded)")
            }
            Self::EmptyCode => "scan a badge or enter an employee ID".to_string(),
            Self::EmployeeNotFound { code } => format!("no employee with ID {code}"),
            Self::QuotaExceeded {
                prize_name,
                quota,
                current_count,
            } => format!("{prize_name} is fully awarded ({current_count} awarded, quota {quota})"),
            Self::AlreadyWon {
                existing_prize_name,
            } => format!("this employee has already won {existing_prize_name}"),
            Self::ConcurrentConflict => {
                "another award was recorded at the same moment; scan again".to_string()
            }
        }
    }
}

/// Body of `POST /prizes/{name}/@award`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardRequest {
    /// Display amount; the catalog's amount is used when blank.
    #[serde(default)]
    pub prize_amount: String,
    #[serde(default)]
    pub scanned_code: String,
}

/// Response of `POST /prizes/{name}/@award`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardResponse {
    #[serde(flatten)]
    pub result: AllocationResult,
    pub message: String,
    /// Winners of this prize after the attempt, most recent first.
    pub winners: Vec<String>,
}

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

/// Answer to "did I win?" on the public page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfCheck {
    pub employee_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award: Option<PrizeAward>,
}

/// Live counters for one catalog tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeTally {
    pub prize_name: String,
    pub display_amount: String,
    pub quota: u32,
    pub awarded: u32,
    pub remaining: u32,
}
