pub mod event;
pub mod promo;
pub mod stats;
pub mod ticket;
pub mod transaction;

pub use event::Event;
pub use promo::PromoCode;
pub use stats::{CountSummary, DashboardStats, RevenueSummary};
pub use ticket::{PaymentType, Ticket, TicketStatus, TicketWithEvent};
pub use transaction::{Transaction, TransactionStatus};
