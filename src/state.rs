use std::sync::Arc;

use crate::config::Config;
use crate::services::mobile_money::MobileMoneySimulator;
use crate::store::TicketStore;

/// Shared by every handler; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TicketStore>,
    pub config: Arc<Config>,
    pub mobile_money: MobileMoneySimulator,
}

impl AppState {
    pub fn new(store: Arc<dyn TicketStore>, config: Config) -> Self {
        let mobile_money = MobileMoneySimulator::new(config.mobile_money.clone());
        Self {
            store,
            config: Arc::new(config),
            mobile_money,
        }
    }
}
