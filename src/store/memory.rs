use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use super::seed::{sample_event, SAMPLE_PROMOS};
use super::{
    ticket_not_found, NewTicket, TicketLookup, TicketStore, INSUFFICIENT_STOCK_MESSAGE,
    PROMO_EXHAUSTED_MESSAGE,
};
use crate::models::{
    CountSummary, DashboardStats, Event, PromoCode, RevenueSummary, Ticket, TicketStatus,
    TicketWithEvent, Transaction, TransactionStatus,
};
use crate::services::lifecycle::{self, Settlement};
use crate::utils::error::AppError;

#[derive(Default)]
struct MemoryState {
    events: BTreeMap<i64, Event>,
    next_event_id: i64,
    promos: HashMap<String, PromoCode>,
    /// Insertion order doubles as creation order.
    tickets: Vec<Ticket>,
    transactions: HashMap<String, Transaction>,
}

impl MemoryState {
    fn ticket_index(&self, ticket_id: &str) -> Option<usize> {
        self.tickets.iter().position(|t| t.id == ticket_id)
    }

    fn with_event_name(&self, ticket: &Ticket) -> TicketWithEvent {
        TicketWithEvent {
            ticket: ticket.clone(),
            event_nom: self
                .events
                .get(&ticket.event_id)
                .map(|e| e.name.clone())
                .unwrap_or_default(),
        }
    }

    fn check_stock(&self, event_id: i64, count: i32) -> Result<(), AppError> {
        match self.events.get(&event_id) {
            Some(event) if event.has_stock_for(count) => Ok(()),
            Some(_) => Err(AppError::Conflict(INSUFFICIENT_STOCK_MESSAGE.to_string())),
            None => Err(AppError::NotFound(format!("Événement {} introuvable", event_id))),
        }
    }

    fn consume_stock(&mut self, event_id: i64, count: i32) {
        if let Some(event) = self.events.get_mut(&event_id) {
            event.remaining_stock -= count;
        }
    }
}

/// In-process store for local runs without PostgreSQL and for tests.
///
/// A single mutex guards all tables, so each operation is atomic. Every
/// check runs before the first write.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_event(
        &self,
        name: &str,
        date: Option<NaiveDate>,
        unit_price: Decimal,
        stock: i32,
    ) -> Event {
        let mut state = self.state.lock().await;
        state.next_event_id += 1;
        let event = Event {
            id: state.next_event_id,
            name: name.to_string(),
            event_date: date,
            unit_price,
            total_stock: stock,
            remaining_stock: stock,
            created_at: Utc::now(),
        };
        state.events.insert(event.id, event.clone());
        event
    }

    pub async fn add_promo(&self, promo: PromoCode) {
        let mut state = self.state.lock().await;
        state.promos.insert(promo.code.clone(), promo);
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn seed_defaults(&self) -> Result<(), AppError> {
        let (events_empty, promos_empty) = {
            let state = self.state.lock().await;
            (state.events.is_empty(), state.promos.is_empty())
        };

        if events_empty {
            let seed = sample_event();
            self.add_event(seed.name, seed.date, seed.unit_price, seed.stock)
                .await;
        }
        if promos_empty {
            for seed in &SAMPLE_PROMOS {
                self.add_promo(PromoCode {
                    code: seed.code.to_string(),
                    percentage: seed.percentage,
                    min_tickets: seed.min_tickets,
                    max_uses: seed.max_uses,
                    use_count: 0,
                    active: true,
                    starts_on: None,
                    ends_on: None,
                    created_at: Utc::now(),
                })
                .await;
            }
        }
        Ok(())
    }

    async fn list_available_events(&self) -> Result<Vec<Event>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .events
            .values()
            .filter(|e| e.remaining_stock > 0)
            .cloned()
            .collect())
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>, AppError> {
        Ok(self.state.lock().await.events.get(&id).cloned())
    }

    async fn find_promo(&self, code: &str) -> Result<Option<PromoCode>, AppError> {
        Ok(self.state.lock().await.promos.get(code).cloned())
    }

    async fn insert_ticket(&self, new_ticket: NewTicket) -> Result<Ticket, AppError> {
        let mut state = self.state.lock().await;
        let NewTicket {
            ticket,
            transaction,
            consumes_stock,
            redeem_promo,
        } = new_ticket;

        if consumes_stock {
            state.check_stock(ticket.event_id, ticket.ticket_count)?;
        } else if !state.events.contains_key(&ticket.event_id) {
            return Err(AppError::NotFound(format!(
                "Événement {} introuvable",
                ticket.event_id
            )));
        }
        if let Some(code) = &redeem_promo {
            match state.promos.get(code) {
                Some(promo) if promo.has_uses_left() => {}
                _ => return Err(AppError::Conflict(PROMO_EXHAUSTED_MESSAGE.to_string())),
            }
        }
        if state
            .tickets
            .iter()
            .any(|t| t.id == ticket.id || t.unique_code == ticket.unique_code)
        {
            return Err(AppError::Conflict(format!(
                "Ticket '{}' existe déjà",
                ticket.id
            )));
        }

        if consumes_stock {
            state.consume_stock(ticket.event_id, ticket.ticket_count);
        }
        if let Some(code) = redeem_promo {
            if let Some(promo) = state.promos.get_mut(&code) {
                promo.use_count += 1;
            }
        }
        state
            .transactions
            .insert(transaction.ticket_id.clone(), transaction);
        state.tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn find_ticket(&self, lookup: &TicketLookup) -> Result<Option<Ticket>, AppError> {
        let state = self.state.lock().await;
        let found = state.tickets.iter().find(|t| match lookup {
            TicketLookup::QrCode(qr) => &t.qr_code == qr,
            TicketLookup::IdOrCode(id) => &t.id == id || &t.unique_code == id,
        });
        Ok(found.cloned())
    }

    async fn find_transaction(&self, ticket_id: &str) -> Result<Option<Transaction>, AppError> {
        Ok(self.state.lock().await.transactions.get(ticket_id).cloned())
    }

    async fn settle_ticket(
        &self,
        ticket_id: &str,
        settlement: &Settlement,
    ) -> Result<Ticket, AppError> {
        let mut state = self.state.lock().await;
        let index = state
            .ticket_index(ticket_id)
            .ok_or_else(|| ticket_not_found(ticket_id))?;
        let (status, event_id, count) = {
            let t = &state.tickets[index];
            (t.status, t.event_id, t.ticket_count)
        };

        let transition = lifecycle::plan(status, settlement)?;
        if transition.consumes_stock {
            state.check_stock(event_id, count)?;
            state.consume_stock(event_id, count);
        }

        let now = Utc::now();
        if let Some(transaction) = state.transactions.get_mut(ticket_id) {
            transaction.status = transition.transaction_status;
            if transition.stamp {
                transaction.completed_at = Some(now);
            }
            if transition.reference.is_some() {
                transaction.external_reference = transition.reference.clone();
            }
            if transition.provider.is_some() {
                transaction.provider = transition.provider.clone();
            }
        }

        let ticket = &mut state.tickets[index];
        ticket.status = transition.ticket_status;
        if transition.stamp {
            ticket.validated_at = Some(now);
        }
        Ok(ticket.clone())
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        let state = self.state.lock().await;

        let count_with = |status: TicketStatus| {
            state.tickets.iter().filter(|t| t.status == status).count() as i64
        };
        let revenue: Decimal = state
            .transactions
            .values()
            .filter(|t| t.status == TransactionStatus::Completed)
            .map(|t| t.amount)
            .sum();

        let tickets_pending = state
            .tickets
            .iter()
            .rev()
            .filter(|t| t.status == TicketStatus::Pending)
            .map(|t| state.with_event_name(t))
            .collect();

        let mut confirmed: Vec<&Ticket> = state
            .tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Confirmed)
            .collect();
        confirmed.sort_by(|a, b| b.validated_at.cmp(&a.validated_at));
        let tickets_recent = confirmed
            .into_iter()
            .take(10)
            .map(|t| state.with_event_name(t))
            .collect();

        Ok(DashboardStats {
            total_tickets: CountSummary {
                count: count_with(TicketStatus::Confirmed),
            },
            pending_tickets: CountSummary {
                count: count_with(TicketStatus::Pending),
            },
            total_revenue: RevenueSummary { total: revenue },
            tickets_pending,
            tickets_recent,
        })
    }
}
