//! Borrow transactions and derived status
//!
//! A borrow links one physical copy to one reader. Its status is never
//! stored: it is derived from the borrow date, the renewal count and the
//! return date, against a supplied "today". Each renewal extends the
//! loan by one more week.

use crate::error::ValidationError;
use crate::types::common::Validator;
use crate::types::ids::{BorrowId, PhysicalBookId, ReaderId};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Length of one loan period
const LOAN_WEEKS: i64 = 1;

/// Derived state of a borrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorrowStatus {
    Borrowed,
    Late,
    Returned,
    ReturnedLate,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Borrowed => "borrowed",
            Self::Late => "late",
            Self::Returned => "returned",
            Self::ReturnedLate => "returned_late",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "borrowed" => Some(Self::Borrowed),
            "late" => Some(Self::Late),
            "returned" => Some(Self::Returned),
            "returned_late" => Some(Self::ReturnedLate),
            _ => None,
        }
    }

    /// True while the copy is still out
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Borrowed | Self::Late)
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Borrowed => "Borrowed",
            Self::Late => "Late",
            Self::Returned => "Returned",
            Self::ReturnedLate => "Returned late",
        };
        write!(f, "{}", label)
    }
}

/// Suggested return date shown when a borrow form is opened
pub fn expected_return(date_borrow: NaiveDate) -> NaiveDate {
    date_borrow + Duration::weeks(LOAN_WEEKS)
}

/// A borrow/return transaction for one physical copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borrow {
    pub id: BorrowId,
    pub book_id: PhysicalBookId,
    pub reader_id: ReaderId,
    pub date_borrow: NaiveDate,
    pub date_return: Option<NaiveDate>,
    pub renew_count: u32,
    pub observation: Option<String>,
}

impl Borrow {
    pub fn new(book_id: PhysicalBookId, reader_id: ReaderId, date_borrow: NaiveDate) -> Self {
        Self {
            id: BorrowId::new(),
            book_id,
            reader_id,
            date_borrow,
            date_return: None,
            renew_count: 0,
            observation: None,
        }
    }

    /// True while no return has been recorded
    pub fn is_open(&self) -> bool {
        self.date_return.is_none()
    }

    /// Due date: one week per allowed loan period, renewals included
    pub fn due_date(&self) -> NaiveDate {
        self.date_borrow + Duration::weeks(LOAN_WEEKS * (1 + i64::from(self.renew_count)))
    }

    /// Derives the status as of `today`
    pub fn status_on(&self, today: NaiveDate) -> BorrowStatus {
        let due = self.due_date();

        if let Some(returned) = self.date_return {
            if returned > due {
                return BorrowStatus::ReturnedLate;
            }
            return BorrowStatus::Returned;
        }

        if today > due {
            BorrowStatus::Late
        } else {
            BorrowStatus::Borrowed
        }
    }

    /// Grants one more week
    pub fn renew(&mut self) {
        self.renew_count += 1;
    }

    /// Records the return of the copy
    pub fn mark_returned(&mut self, date_return: NaiveDate) {
        self.date_return = Some(date_return);
    }
}

impl Validator for Borrow {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if let Some(date_return) = self.date_return {
            if date_return < self.date_borrow {
                errors.add("date_return", "Return date cannot be before borrow date");
            }
        }

        errors.into_result()
    }
}
