use crate::gateway::GatewayClient;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub db_schema: Option<String>,
    pub env_name: String,
    pub base_currency: String,
    pub secondary_currency: String,
    pub exchange_rate: i64,
    pub min_payment_amount: i64,
    pub public_base_url: String,
    pub webhook_secret: Option<String>,
    pub gateway: GatewayClient,
}

impl AppState {
    pub fn table(&self, name: &str) -> String {
        match &self.db_schema {
            Some(s) => format!("{s}.{name}"),
            None => name.to_string(),
        }
    }
}
