//! Domain models for Pocketbook

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Description prefix of the income transaction mirrored from a loan take
pub const LOAN_TAKEN_PREFIX: &str = "Loan taken: ";

/// Description prefix of the negative income transaction mirrored from a loan clear
pub const LOAN_CLEARED_PREFIX: &str = "Loan cleared: ";

/// Category stamped on every mirrored loan transaction
pub const LOAN_CATEGORY: &str = "Loan";

/// Description of the automatic month-end savings transaction
pub const END_OF_MONTH_DESCRIPTION: &str = "End of month savings";

/// Largest amount one entry, loan event or goal may carry: 1,000,000,000,000
///
/// Keeps every per-user total far below `Decimal::MAX`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Check a user-supplied amount is positive and no larger than [`MAX_AMOUNT`]
pub fn validate_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge(MAX_AMOUNT));
    }
    Ok(())
}

/// A locally registered user (identity record)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted transaction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Savings,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Savings => "savings",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "savings" => Ok(Self::Savings),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of entry a user can submit.
///
/// `Loan` is never persisted as a transaction type: it routes the entry to the
/// loan ledger, which writes the loan event and its mirrored income row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
    Savings,
    Loan,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Savings => "savings",
            Self::Loan => "loan",
        }
    }

    /// The persisted type for plain entries, `None` for loan entries
    pub fn transaction_type(&self) -> Option<TransactionType> {
        match self {
            Self::Income => Some(TransactionType::Income),
            Self::Expense => Some(TransactionType::Expense),
            Self::Savings => Some(TransactionType::Savings),
            Self::Loan => None,
        }
    }
}

impl std::str::FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "savings" => Ok(Self::Savings),
            "loan" => Ok(Self::Loan),
            _ => Err(format!(
                "Unknown entry type: {} (valid: income, expense, savings, loan)",
                s
            )),
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded financial event. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    /// Saved amount; zero unless `kind` is savings
    pub savings: Decimal,
    pub description: String,
    pub category: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Whether this row mirrors a loan event rather than real income
    pub fn is_loan_mirror(&self) -> bool {
        self.description.starts_with(LOAN_TAKEN_PREFIX)
            || self.description.starts_with(LOAN_CLEARED_PREFIX)
    }
}

/// A transaction to be recorded (before DB insertion)
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionType,
    pub amount: Decimal,
    pub savings: Decimal,
    pub description: String,
    pub category: String,
    pub date: DateTime<Utc>,
}

impl NewTransaction {
    /// Plain income or expense entry
    pub fn new(
        kind: TransactionType,
        amount: Decimal,
        description: impl Into<String>,
        category: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            amount,
            savings: Decimal::ZERO,
            description: description.into(),
            category: category.into(),
            date,
        }
    }

    /// User-entered savings: the requested amount is stored in both fields
    pub fn savings(
        amount: Decimal,
        description: impl Into<String>,
        category: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: TransactionType::Savings,
            amount,
            savings: amount,
            description: description.into(),
            category: category.into(),
            date,
        }
    }

    /// Automatic month-end savings: zero amount, balance carried in `savings`
    pub fn end_of_month(balance: Decimal, date: DateTime<Utc>) -> Self {
        Self {
            kind: TransactionType::Savings,
            amount: Decimal::ZERO,
            savings: balance,
            description: END_OF_MONTH_DESCRIPTION.to_string(),
            category: String::new(),
            date,
        }
    }
}

// ========== Loan Models ==========

/// Action recorded against a counterparty loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanAction {
    Take,
    Clear,
}

impl LoanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Take => "take",
            Self::Clear => "clear",
        }
    }

    /// Description of the income row mirrored from this action
    pub fn mirror_description(&self, counterparty: &str) -> String {
        match self {
            Self::Take => format!("{}{}", LOAN_TAKEN_PREFIX, counterparty),
            Self::Clear => format!("{}{}", LOAN_CLEARED_PREFIX, counterparty),
        }
    }

    /// Signed income amount mirrored from this action (clears are negative)
    pub fn mirror_amount(&self, amount: Decimal) -> Decimal {
        match self {
            Self::Take => amount,
            Self::Clear => -amount,
        }
    }
}

impl std::str::FromStr for LoanAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "take" => Ok(Self::Take),
            "clear" => Ok(Self::Clear),
            _ => Err(format!("Unknown loan action: {} (valid: take, clear)", s)),
        }
    }
}

impl std::fmt::Display for LoanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One take or clear event in a loan's history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoanEvent {
    /// Position in the loan's history, starting at 0
    pub seq: i64,
    pub action: LoanAction,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub note: String,
}

/// Lifecycle of a loan: active while money is owed, settled at zero.
/// A further take reopens a settled loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanState {
    Active,
    Settled,
}

/// A per-counterparty loan with its ordered event history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Loan {
    pub id: i64,
    pub user_id: String,
    /// Counterparty name
    pub name: String,
    /// Outstanding amount right after the most recent take
    pub total_amount: Decimal,
    pub remaining_amount: Decimal,
    pub events: Vec<LoanEvent>,
}

impl Loan {
    pub fn state(&self) -> LoanState {
        if self.remaining_amount > Decimal::ZERO {
            LoanState::Active
        } else {
            LoanState::Settled
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == LoanState::Active
    }

    /// Cumulative principal: the sum of every take event
    pub fn principal_borrowed(&self) -> Decimal {
        self.sum_of(LoanAction::Take)
    }

    /// Cumulative repayments: the sum of every clear event
    pub fn total_cleared(&self) -> Decimal {
        self.sum_of(LoanAction::Clear)
    }

    fn sum_of(&self, action: LoanAction) -> Decimal {
        self.events
            .iter()
            .filter(|e| e.action == action)
            .map(|e| e.amount)
            .sum()
    }

    // Co-indexed views of the history, one entry per event.

    pub fn descriptions(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.note.as_str()).collect()
    }

    pub fn dates(&self) -> Vec<DateTime<Utc>> {
        self.events.iter().map(|e| e.date).collect()
    }

    pub fn amounts(&self) -> Vec<Decimal> {
        self.events.iter().map(|e| e.amount).collect()
    }

    pub fn actions(&self) -> Vec<LoanAction> {
        self.events.iter().map(|e| e.action).collect()
    }
}

/// Which loan a take event applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "counterparty")]
pub enum LoanTarget {
    /// First take from a counterparty without a loan yet
    New { name: String },
    /// Further take against an existing loan
    Existing { loan_id: i64 },
}

/// A loan event ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoanEvent {
    pub action: LoanAction,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub note: String,
}

/// Result of a loan event write: the updated loan and its mirrored transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanEventRecord {
    pub loan: Loan,
    pub mirror: Transaction,
}

// ========== Goal Models ==========

/// Goal horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Monthly,
    Yearly,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown goal type: {} (valid: monthly, yearly)", s)),
        }
    }
}

impl std::fmt::Display for GoalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Goal status, toggled by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Pending,
    Completed,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Unknown goal status: {}", s)),
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user-defined savings goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: i64,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: GoalType,
    pub amount: Decimal,
    pub description: String,
    pub target_date: NaiveDate,
    /// 1 = highest
    pub priority: i64,
    pub goal_created: DateTime<Utc>,
    pub status: GoalStatus,
    /// Always equal to `status == completed`
    pub is_reached: bool,
}

/// A goal to be created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGoal {
    #[serde(rename = "type")]
    pub kind: GoalType,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub target_date: NaiveDate,
    #[serde(default = "default_priority")]
    pub priority: i64,
}

fn default_priority() -> i64 {
    1
}

// ========== Report Models ==========

/// A loan event flattened into the activity feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoanActivity {
    pub loan_id: i64,
    pub seq: i64,
    pub loan_action: LoanAction,
    /// Counterparty name
    pub name: String,
    pub description: String,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
}

/// One row of the dashboard activity feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityItem {
    Transaction(Transaction),
    Loan(LoanActivity),
}

impl ActivityItem {
    pub fn date(&self) -> DateTime<Utc> {
        match self {
            Self::Transaction(t) => t.date,
            Self::Loan(l) => l.date,
        }
    }
}

/// Aggregated figures for one view period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    pub income: Decimal,
    pub expenses: Decimal,
    /// All-time savings, independent of the view period
    pub savings: Decimal,
    /// Savings recorded within the view period
    pub period_savings: Decimal,
    /// `income - expenses` for the view period
    pub balance: Decimal,
    /// Sum of remaining amounts across all loans
    pub loan_balance: Decimal,
    /// Activity on the anchor day, newest first
    pub feed: Vec<ActivityItem>,
}

/// Income/expense/savings totals for one chart bucket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartBucket {
    /// `YYYY-MM-DD`, `YYYY-M` or `YYYY` depending on the view
    pub date: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub savings: Decimal,
}

/// A category's share of a period total
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub amount: Decimal,
    /// Percent of the period total, one decimal place
    pub percentage: Decimal,
}

/// Live progress of a savings goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalProgress {
    pub goal_id: i64,
    pub total_saved: Decimal,
    /// Unclamped; may exceed 100
    pub progress_percentage: Decimal,
    pub remaining: Decimal,
}
