use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::schedule;
use crate::types::{BorrowerId, LoanId, LoanStatus};

/// loan snapshot as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    // identification
    pub id: LoanId,
    pub borrower_id: BorrowerId,

    // balances
    pub total_principal: Money,
    pub current_due_amount: Money,
    pub installment_amount: Money,
    pub interest_rate: Rate,

    // schedule
    pub next_due_date: DateTime<Utc>,
    pub paid_installments_count: u32,
    pub missed_installments_count: u32,

    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
}

impl Loan {
    /// open a new loan; the first installment falls due one period after origination
    pub fn originate(borrower_id: BorrowerId, terms: &LoanTerms, now: DateTime<Utc>) -> Result<Self> {
        terms.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            borrower_id,
            total_principal: terms.principal,
            current_due_amount: terms.principal,
            installment_amount: terms.installment_amount,
            interest_rate: terms.interest_rate,
            next_due_date: schedule::first_due_date(now),
            paid_installments_count: 0,
            missed_installments_count: 0,
            status: LoanStatus::Active,
            created_at: now,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// amount repaid against principal, ignoring penalties
    pub fn principal_repaid(&self) -> Money {
        self.total_principal.saturating_sub(self.current_due_amount)
    }

    /// installments still expected at the configured hafta
    pub fn remaining_installments(&self) -> u32 {
        if self.current_due_amount.is_zero() || !self.installment_amount.is_positive() {
            return 0;
        }
        let remaining = (self.current_due_amount.as_decimal() / self.installment_amount.as_decimal()).ceil();
        remaining.to_u32().unwrap_or(u32::MAX)
    }

    /// suggested payment: the hafta, capped at what is still due
    pub fn suggested_payment(&self) -> Money {
        self.installment_amount.min(self.current_due_amount)
    }
}

/// terms supplied when a loan is originated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub installment_amount: Money,
    pub interest_rate: Rate,
}

impl LoanTerms {
    pub fn new(principal: Money, installment_amount: Money, interest_rate: Rate) -> Self {
        Self {
            principal,
            installment_amount,
            interest_rate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_principal(self.principal)?;
        validate_installment(self.installment_amount)?;
        validate_interest_rate(self.interest_rate)
    }
}

/// admin edit of loan terms; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanEdit {
    pub total_principal: Option<Money>,
    pub installment_amount: Option<Money>,
    pub interest_rate: Option<Rate>,
    pub current_due_amount: Option<Money>,
}

impl LoanEdit {
    pub fn validate(&self) -> Result<()> {
        if let Some(principal) = self.total_principal {
            validate_principal(principal)?;
        }
        if let Some(installment) = self.installment_amount {
            validate_installment(installment)?;
        }
        if let Some(rate) = self.interest_rate {
            validate_interest_rate(rate)?;
        }
        if let Some(due) = self.current_due_amount {
            if due.is_negative() {
                return Err(LedgerError::invalid_input("current_due_amount", "must not be negative"));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.to_patch().is_empty()
    }

    pub fn to_patch(&self) -> LoanPatch {
        LoanPatch {
            total_principal: self.total_principal,
            installment_amount: self.installment_amount,
            interest_rate: self.interest_rate,
            current_due_amount: self.current_due_amount,
            ..LoanPatch::default()
        }
    }
}

/// partial loan update handed to the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanPatch {
    pub total_principal: Option<Money>,
    pub current_due_amount: Option<Money>,
    pub installment_amount: Option<Money>,
    pub interest_rate: Option<Rate>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub paid_installments_count: Option<u32>,
    pub missed_installments_count: Option<u32>,
    pub status: Option<LoanStatus>,
}

impl LoanPatch {
    pub fn status(status: LoanStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, loan: &mut Loan) {
        if let Some(v) = self.total_principal {
            loan.total_principal = v;
        }
        if let Some(v) = self.current_due_amount {
            loan.current_due_amount = v;
        }
        if let Some(v) = self.installment_amount {
            loan.installment_amount = v;
        }
        if let Some(v) = self.interest_rate {
            loan.interest_rate = v;
        }
        if let Some(v) = self.next_due_date {
            loan.next_due_date = v;
        }
        if let Some(v) = self.paid_installments_count {
            loan.paid_installments_count = v;
        }
        if let Some(v) = self.missed_installments_count {
            loan.missed_installments_count = v;
        }
        if let Some(v) = self.status {
            loan.status = v;
        }
    }
}

/// borrower record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borrower {
    pub id: BorrowerId,
    pub name: String,
    pub mobile_number: String,
    pub photo_url: String,
    pub created_at: DateTime<Utc>,
}

impl Borrower {
    pub fn register(new: NewBorrower, now: DateTime<Utc>) -> Result<Self> {
        let name = non_blank("name", &new.name)?;
        let mobile_number = non_blank("mobile_number", &new.mobile_number)?;

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            mobile_number,
            photo_url: new.photo_url.unwrap_or_default(),
            created_at: now,
        })
    }

    /// placeholder used when a loan's borrower record has gone missing
    pub fn unknown(id: BorrowerId) -> Self {
        Self {
            id,
            name: "Unknown Borrower".to_string(),
            mobile_number: String::new(),
            photo_url: String::new(),
            created_at: DateTime::<Utc>::default(),
        }
    }

    /// case-insensitive name match or mobile number substring
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty()
            || self.name.to_lowercase().contains(&query.to_lowercase())
            || self.mobile_number.contains(query)
    }

    pub fn apply_edit(&mut self, edit: &BorrowerEdit) -> Result<()> {
        let name = edit.name.as_deref().map(|n| non_blank("name", n)).transpose()?;
        let mobile = edit
            .mobile_number
            .as_deref()
            .map(|m| non_blank("mobile_number", m))
            .transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(mobile) = mobile {
            self.mobile_number = mobile;
        }
        if let Some(url) = &edit.photo_url {
            self.photo_url = url.clone();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBorrower {
    pub name: String,
    pub mobile_number: String,
    pub photo_url: Option<String>,
}

impl NewBorrower {
    pub fn new(name: impl Into<String>, mobile_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mobile_number: mobile_number.into(),
            photo_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorrowerEdit {
    pub name: Option<String>,
    pub mobile_number: Option<String>,
    pub photo_url: Option<String>,
}

fn non_blank(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::invalid_input(field, "must not be blank"));
    }
    Ok(trimmed.to_string())
}

fn validate_principal(principal: Money) -> Result<()> {
    if !principal.is_positive() {
        return Err(LedgerError::invalid_input("total_principal", format!("{} must be positive", principal)));
    }
    Ok(())
}

fn validate_installment(installment: Money) -> Result<()> {
    if !installment.is_positive() {
        return Err(LedgerError::invalid_input(
            "installment_amount",
            format!("{} must be positive", installment),
        ));
    }
    Ok(())
}

fn validate_interest_rate(rate: Rate) -> Result<()> {
    if rate.is_negative() {
        return Err(LedgerError::invalid_input("interest_rate", format!("{} must not be negative", rate)));
    }
    Ok(())
}
