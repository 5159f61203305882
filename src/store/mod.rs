//! Storage client for the ticketing tables.
//!
//! Handlers only see [`TicketStore`]; `main` picks the backend once at
//! startup. Every multi-row write (issuance, settlement) is atomic: it either
//! lands completely or not at all.

use async_trait::async_trait;

use crate::models::{DashboardStats, Event, PromoCode, Ticket, Transaction};
use crate::services::lifecycle::Settlement;
use crate::utils::error::AppError;

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const INSUFFICIENT_STOCK_MESSAGE: &str = "Stock insuffisant";
pub const PROMO_EXHAUSTED_MESSAGE: &str = "Code promo épuisé";

/// A fully built ticket and its payment record, ready to persist.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub ticket: Ticket,
    pub transaction: Transaction,
    /// Decrement the event's stock by the ticket count.
    pub consumes_stock: bool,
    /// Promo code whose usage counter is bumped.
    pub redeem_promo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketLookup {
    QrCode(String),
    /// Matches either the ticket id or its unique code.
    IdOrCode(String),
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Connectivity probe.
    async fn ping(&self) -> Result<(), AppError>;

    /// Inserts the sample event and promo codes into empty tables.
    async fn seed_defaults(&self) -> Result<(), AppError>;

    /// Events that still have stock.
    async fn list_available_events(&self) -> Result<Vec<Event>, AppError>;

    async fn find_event(&self, id: i64) -> Result<Option<Event>, AppError>;

    /// `code` must already be normalized.
    async fn find_promo(&self, code: &str) -> Result<Option<PromoCode>, AppError>;

    async fn insert_ticket(&self, new_ticket: NewTicket) -> Result<Ticket, AppError>;

    async fn find_ticket(&self, lookup: &TicketLookup) -> Result<Option<Ticket>, AppError>;

    async fn find_transaction(&self, ticket_id: &str) -> Result<Option<Transaction>, AppError>;

    /// Applies a settlement planned by [`crate::services::lifecycle::plan`]
    /// and returns the updated ticket.
    async fn settle_ticket(
        &self,
        ticket_id: &str,
        settlement: &Settlement,
    ) -> Result<Ticket, AppError>;

    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError>;
}

pub(crate) fn ticket_not_found(ticket_id: &str) -> AppError {
    AppError::NotFound(format!("Ticket '{}' introuvable", ticket_id))
}
