use chrono::NaiveDate;
use rust_decimal::Decimal;

pub struct SeedEvent {
    pub name: &'static str,
    pub date: Option<NaiveDate>,
    pub unit_price: Decimal,
    pub stock: i32,
}

pub struct SeedPromo {
    pub code: &'static str,
    pub percentage: i32,
    pub min_tickets: i32,
    pub max_uses: i32,
}

pub fn sample_event() -> SeedEvent {
    SeedEvent {
        name: "Village de Noël KIDS EVENTS",
        date: NaiveDate::from_ymd_opt(2024, 12, 25),
        unit_price: Decimal::from(5000),
        stock: 200,
    }
}

pub const SAMPLE_PROMOS: [SeedPromo; 3] = [
    SeedPromo {
        code: "NOEL2024",
        percentage: 10,
        min_tickets: 1,
        max_uses: -1,
    },
    SeedPromo {
        code: "FAMILLE",
        percentage: 15,
        min_tickets: 4,
        max_uses: -1,
    },
    SeedPromo {
        code: "EARLY",
        percentage: 20,
        min_tickets: 1,
        max_uses: 50,
    },
];
