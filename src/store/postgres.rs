use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{PgConnection, Postgres};

use super::seed::{sample_event, SAMPLE_PROMOS};
use super::{
    ticket_not_found, NewTicket, TicketLookup, TicketStore, INSUFFICIENT_STOCK_MESSAGE,
    PROMO_EXHAUSTED_MESSAGE,
};
use crate::models::{
    CountSummary, DashboardStats, Event, PromoCode, RevenueSummary, Ticket, TicketWithEvent,
    Transaction,
};
use crate::services::lifecycle::{self, Settlement};
use crate::utils::error::AppError;

const TICKETS_WITH_EVENT: &str = "SELECT t.*, e.nom AS event_nom \
     FROM tickets t JOIN events e ON t.event_id = e.id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }
}

async fn consume_stock(
    conn: &mut PgConnection,
    event_id: i64,
    count: i32,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE events SET stock_restant = stock_restant - $1 \
         WHERE id = $2 AND stock_restant >= $1",
    )
    .bind(count)
    .bind(event_id)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(INSUFFICIENT_STOCK_MESSAGE.to_string()));
    }
    Ok(())
}

#[async_trait]
impl TicketStore for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    async fn seed_defaults(&self) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let events: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&mut *tx)
            .await?;
        if events == 0 {
            let event = sample_event();
            sqlx::query(
                "INSERT INTO events (nom, date_event, prix_unitaire, stock_total, stock_restant) \
                 VALUES ($1, $2, $3, $4, $4)",
            )
            .bind(event.name)
            .bind(event.date)
            .bind(event.unit_price)
            .bind(event.stock)
            .execute(&mut *tx)
            .await?;
            tracing::info!(name = event.name, "Seeded sample event");
        }

        let promos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM codes_reduction")
            .fetch_one(&mut *tx)
            .await?;
        if promos == 0 {
            for promo in &SAMPLE_PROMOS {
                sqlx::query(
                    "INSERT INTO codes_reduction (code, pourcentage, min_billets, max_utilisations) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(promo.code)
                .bind(promo.percentage)
                .bind(promo.min_tickets)
                .bind(promo.max_uses)
                .execute(&mut *tx)
                .await?;
            }
            tracing::info!(count = SAMPLE_PROMOS.len(), "Seeded sample promo codes");
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_available_events(&self) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE stock_restant > 0 ORDER BY date_event NULLS LAST, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn find_promo(&self, code: &str) -> Result<Option<PromoCode>, AppError> {
        let promo = sqlx::query_as::<_, PromoCode>("SELECT * FROM codes_reduction WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(promo)
    }

    async fn insert_ticket(&self, new_ticket: NewTicket) -> Result<Ticket, AppError> {
        let NewTicket {
            ticket,
            transaction,
            consumes_stock,
            redeem_promo,
        } = new_ticket;

        // Dropping `tx` on any early return rolls everything back.
        let mut tx: sqlx::Transaction<'_, Postgres> = self.pool.begin().await?;

        if consumes_stock {
            consume_stock(&mut tx, ticket.event_id, ticket.ticket_count).await?;
        }

        if let Some(code) = &redeem_promo {
            let redeemed = sqlx::query(
                "UPDATE codes_reduction SET utilisations_actuelles = utilisations_actuelles + 1 \
                 WHERE code = $1 AND (max_utilisations = -1 OR utilisations_actuelles < max_utilisations)",
            )
            .bind(code)
            .execute(&mut *tx)
            .await?;
            if redeemed.rows_affected() == 0 {
                return Err(AppError::Conflict(PROMO_EXHAUSTED_MESSAGE.to_string()));
            }
        }

        let stored = sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets (id, event_id, code_unique, qr_code, nombre_billets, prix_total, \
             type_paiement, code_promo, statut, date_creation, date_validation) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(&ticket.id)
        .bind(ticket.event_id)
        .bind(&ticket.unique_code)
        .bind(&ticket.qr_code)
        .bind(ticket.ticket_count)
        .bind(ticket.total_price)
        .bind(ticket.payment_type)
        .bind(&ticket.promo_code)
        .bind(ticket.status)
        .bind(ticket.created_at)
        .bind(ticket.validated_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO transactions (id, ticket_id, montant, methode_paiement, statut, \
             mobile_money_provider, mobile_money_numero, created_at, completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&transaction.id)
        .bind(&transaction.ticket_id)
        .bind(transaction.amount)
        .bind(transaction.payment_method)
        .bind(transaction.status)
        .bind(&transaction.provider)
        .bind(&transaction.phone_number)
        .bind(transaction.created_at)
        .bind(transaction.completed_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stored)
    }

    async fn find_ticket(&self, lookup: &TicketLookup) -> Result<Option<Ticket>, AppError> {
        let query = match lookup {
            TicketLookup::QrCode(qr) => {
                sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE qr_code = $1 LIMIT 1")
                    .bind(qr)
            }
            TicketLookup::IdOrCode(id) => sqlx::query_as::<_, Ticket>(
                "SELECT * FROM tickets WHERE id = $1 OR code_unique = $1 LIMIT 1",
            )
            .bind(id),
        };
        Ok(query.fetch_optional(&self.pool).await?)
    }

    async fn find_transaction(&self, ticket_id: &str) -> Result<Option<Transaction>, AppError> {
        let transaction =
            sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE ticket_id = $1")
                .bind(ticket_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(transaction)
    }

    async fn settle_ticket(
        &self,
        ticket_id: &str,
        settlement: &Settlement,
    ) -> Result<Ticket, AppError> {
        let mut tx = self.pool.begin().await?;

        let current =
            sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1 FOR UPDATE")
                .bind(ticket_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| ticket_not_found(ticket_id))?;

        let transition = lifecycle::plan(current.status, settlement)?;

        let updated = sqlx::query_as::<_, Ticket>(
            "UPDATE tickets SET statut = $2, \
             date_validation = CASE WHEN $3 THEN NOW() ELSE date_validation END \
             WHERE id = $1 RETURNING *",
        )
        .bind(ticket_id)
        .bind(transition.ticket_status)
        .bind(transition.stamp)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE transactions SET statut = $2, \
             completed_at = CASE WHEN $3 THEN NOW() ELSE completed_at END, \
             reference_externe = COALESCE($4, reference_externe), \
             mobile_money_provider = COALESCE($5, mobile_money_provider) \
             WHERE ticket_id = $1",
        )
        .bind(ticket_id)
        .bind(transition.transaction_status)
        .bind(transition.stamp)
        .bind(&transition.reference)
        .bind(&transition.provider)
        .execute(&mut *tx)
        .await?;

        if transition.consumes_stock {
            consume_stock(&mut tx, current.event_id, current.ticket_count).await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        let pending_sql = format!(
            "{} WHERE t.statut = 'pending' ORDER BY t.date_creation DESC",
            TICKETS_WITH_EVENT
        );
        let recent_sql = format!(
            "{} WHERE t.statut = 'confirmed' ORDER BY t.date_validation DESC NULLS LAST LIMIT 10",
            TICKETS_WITH_EVENT
        );

        let (confirmed, pending, revenue, tickets_pending, tickets_recent) = tokio::try_join!(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets WHERE statut = 'confirmed'")
                .fetch_one(&self.pool),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets WHERE statut = 'pending'")
                .fetch_one(&self.pool),
            sqlx::query_scalar::<_, Decimal>(
                "SELECT COALESCE(SUM(montant), 0) FROM transactions WHERE statut = 'completed'",
            )
            .fetch_one(&self.pool),
            sqlx::query_as::<_, TicketWithEvent>(&pending_sql).fetch_all(&self.pool),
            sqlx::query_as::<_, TicketWithEvent>(&recent_sql).fetch_all(&self.pool),
        )?;

        Ok(DashboardStats {
            total_tickets: CountSummary { count: confirmed },
            pending_tickets: CountSummary { count: pending },
            total_revenue: RevenueSummary { total: revenue },
            tickets_pending,
            tickets_recent,
        })
    }
}
