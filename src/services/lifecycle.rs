//! Ticket status rules shared by every storage backend.
//!
//! A ticket is born `pending` (or `confirmed` when paid by mobile money) and is
//! settled at most once. Stock is consumed exactly once, on the transition
//! into `confirmed`.

use serde::Deserialize;

use crate::models::{PaymentType, TicketStatus, TransactionStatus};
use crate::utils::error::AppError;

/// Admin decision on a pending ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationAction {
    Approve,
    Reject,
}

/// Something that settles a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Admin(ValidationAction),
    PaymentConfirmed {
        reference: Option<String>,
        provider: Option<String>,
    },
}

/// What a store must write to apply a settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub ticket_status: TicketStatus,
    pub transaction_status: TransactionStatus,
    /// Stamp `date_validation` / `completed_at`.
    pub stamp: bool,
    pub consumes_stock: bool,
    pub reference: Option<String>,
    pub provider: Option<String>,
}

pub fn initial_status(payment: PaymentType) -> (TicketStatus, TransactionStatus) {
    match payment {
        PaymentType::MobileMoney => (TicketStatus::Confirmed, TransactionStatus::Completed),
        PaymentType::Cash | PaymentType::Card => {
            (TicketStatus::Pending, TransactionStatus::Pending)
        }
    }
}

pub fn plan(current: TicketStatus, settlement: &Settlement) -> Result<Transition, AppError> {
    match (current, settlement) {
        (TicketStatus::Pending, Settlement::Admin(ValidationAction::Approve)) => Ok(Transition {
            ticket_status: TicketStatus::Confirmed,
            transaction_status: TransactionStatus::Completed,
            stamp: true,
            consumes_stock: true,
            reference: None,
            provider: None,
        }),
        (TicketStatus::Pending, Settlement::Admin(ValidationAction::Reject)) => Ok(Transition {
            ticket_status: TicketStatus::Rejected,
            transaction_status: TransactionStatus::Failed,
            stamp: true,
            consumes_stock: false,
            reference: None,
            provider: None,
        }),
        (TicketStatus::Pending, Settlement::PaymentConfirmed { reference, provider }) => {
            Ok(Transition {
                ticket_status: TicketStatus::Confirmed,
                transaction_status: TransactionStatus::Completed,
                stamp: true,
                consumes_stock: true,
                reference: reference.clone(),
                provider: provider.clone(),
            })
        }
        // Mobile-money tickets are confirmed at issuance; the provider's
        // callback only brings the external reference.
        (TicketStatus::Confirmed, Settlement::PaymentConfirmed { reference, provider }) => {
            Ok(Transition {
                ticket_status: TicketStatus::Confirmed,
                transaction_status: TransactionStatus::Completed,
                stamp: false,
                consumes_stock: false,
                reference: reference.clone(),
                provider: provider.clone(),
            })
        }
        (status, _) => Err(AppError::Conflict(format!(
            "Ticket déjà traité - Statut: {}",
            status
        ))),
    }
}
