use rust_decimal::Decimal;
use serde::Serialize;

use super::ticket::TicketWithEvent;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CountSummary {
    pub count: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RevenueSummary {
    pub total: Decimal,
}

/// Admin dashboard figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Confirmed tickets.
    pub total_tickets: CountSummary,
    pub pending_tickets: CountSummary,
    /// Sum of completed transactions.
    pub total_revenue: RevenueSummary,
    /// Pending tickets, newest first.
    pub tickets_pending: Vec<TicketWithEvent>,
    /// Last ten confirmed tickets by validation time.
    pub tickets_recent: Vec<TicketWithEvent>,
}
