//! Entry submission
//!
//! [`EntryForm`] is the raw add-entry input: an untyped `type` string, a
//! date with an optional time of day and the loan fields used only when the
//! type is `loan`. [`EntryForm::validate`] turns it into an [`Entry`] before
//! anything is written.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::{
    validate_amount, EntryKind, LoanAction, LoanEventRecord, LoanTarget, NewLoanEvent,
    NewTransaction, Transaction, TransactionType,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryForm {
    /// `income`, `expense`, `savings` or `loan`
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub date: NaiveDate,
    /// Time of day (UTC); midnight when omitted
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub loan_action: Option<LoanAction>,
    /// Counterparty for a first take
    #[serde(default)]
    pub loan_name: Option<String>,
    /// Existing loan for further takes and clears
    #[serde(default)]
    pub loan_id: Option<i64>,
}

/// A validated entry, ready for the ledger
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Plain(NewTransaction),
    Loan {
        target: LoanTarget,
        event: NewLoanEvent,
    },
}

/// What a submitted entry produced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryOutcome {
    Transaction(Transaction),
    Loan(LoanEventRecord),
}

impl EntryForm {
    pub fn new(kind: &str, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            kind: kind.to_string(),
            amount,
            description: String::new(),
            category: String::new(),
            date,
            time: None,
            loan_action: None,
            loan_name: None,
            loan_id: None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.date
            .and_time(self.time.unwrap_or(NaiveTime::MIN))
            .and_utc()
    }

    pub fn validate(&self) -> std::result::Result<Entry, ValidationError> {
        let kind: EntryKind = self
            .kind
            .parse()
            .map_err(|_| ValidationError::InvalidTransactionType(self.kind.clone()))?;

        validate_amount(self.amount)?;

        let date = self.timestamp();
        let entry = match kind.transaction_type() {
            Some(TransactionType::Savings) => Entry::Plain(NewTransaction::savings(
                self.amount,
                self.description.clone(),
                self.category.clone(),
                date,
            )),
            Some(kind) => Entry::Plain(NewTransaction::new(
                kind,
                self.amount,
                self.description.clone(),
                self.category.clone(),
                date,
            )),
            None => {
                let action = self.loan_action.ok_or(ValidationError::MissingLoanAction)?;
                let name = self
                    .loan_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty());

                let target = match (action, self.loan_id, name) {
                    (_, Some(loan_id), _) => LoanTarget::Existing { loan_id },
                    (LoanAction::Take, None, Some(name)) => LoanTarget::New {
                        name: name.to_string(),
                    },
                    (LoanAction::Take, None, None) => {
                        return Err(ValidationError::MissingCounterparty)
                    }
                    (LoanAction::Clear, None, _) => return Err(ValidationError::LoanNotFound),
                };

                Entry::Loan {
                    target,
                    event: NewLoanEvent {
                        action,
                        amount: self.amount,
                        date,
                        note: self.description.clone(),
                    },
                }
            }
        };

        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_AMOUNT;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_rejects_unknown_type() {
        let form = EntryForm::new("transfer", dec!(10), date());
        assert_eq!(
            form.validate(),
            Err(ValidationError::InvalidTransactionType("transfer".to_string()))
        );
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let form = EntryForm::new("expense", dec!(0), date());
        assert_eq!(form.validate(), Err(ValidationError::NonPositiveAmount));
    }

    #[test]
    fn test_amount_cap_boundary() {
        assert!(EntryForm::new("income", MAX_AMOUNT, date()).validate().is_ok());
        assert_eq!(
            EntryForm::new("income", MAX_AMOUNT + dec!(0.01), date()).validate(),
            Err(ValidationError::AmountTooLarge(MAX_AMOUNT))
        );
    }

    #[test]
    fn test_savings_entry_stores_amount_twice() {
        let form = EntryForm::new("savings", dec!(75), date());
        match form.validate().unwrap() {
            Entry::Plain(tx) => {
                assert_eq!(tx.kind, TransactionType::Savings);
                assert_eq!(tx.amount, dec!(75));
                assert_eq!(tx.savings, dec!(75));
            }
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[test]
    fn test_time_of_day_is_applied() {
        let mut form = EntryForm::new("income", dec!(5), date());
        form.time = NaiveTime::from_hms_opt(14, 30, 0);
        assert_eq!(form.timestamp().to_rfc3339(), "2024-03-05T14:30:00+00:00");
    }

    #[test]
    fn test_loan_entry_targets() {
        let mut form = EntryForm::new("loan", dec!(500), date());
        assert_eq!(form.validate(), Err(ValidationError::MissingLoanAction));

        form.loan_action = Some(LoanAction::Take);
        form.loan_name = Some("   ".to_string());
        assert_eq!(form.validate(), Err(ValidationError::MissingCounterparty));

        form.loan_name = Some(" Alice ".to_string());
        match form.validate().unwrap() {
            Entry::Loan { target, event } => {
                assert_eq!(
                    target,
                    LoanTarget::New {
                        name: "Alice".to_string()
                    }
                );
                assert_eq!(event.amount, dec!(500));
            }
            other => panic!("unexpected entry: {:?}", other),
        }

        form.loan_action = Some(LoanAction::Clear);
        form.loan_name = None;
        assert_eq!(form.validate(), Err(ValidationError::LoanNotFound));

        form.loan_id = Some(7);
        assert!(matches!(
            form.validate(),
            Ok(Entry::Loan {
                target: LoanTarget::Existing { loan_id: 7 },
                ..
            })
        ));
    }
}
