use sqlx::postgres::{PgPool, PgPoolOptions};

fn table_name(schema: &Option<String>, name: &str) -> String {
    match schema {
        Some(s) => format!("{s}.{name}"),
        None => name.to_string(),
    }
}

pub async fn connect(db_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(db_url)
        .await
}

pub async fn ensure_schema(pool: &PgPool, db_schema: &Option<String>) -> Result<(), sqlx::Error> {
    if let Some(schema) = db_schema {
        let ddl = format!("CREATE SCHEMA IF NOT EXISTS {schema}");
        let _ = sqlx::query(&ddl).execute(pool).await;
    }

    let ferries = table_name(db_schema, "ferries");
    let routes = table_name(db_schema, "routes");
    let schedules = table_name(db_schema, "schedules");
    let bookings = table_name(db_schema, "bookings");
    let payments = table_name(db_schema, "payments");

    let ddls = [
        format!(
            "CREATE TABLE IF NOT EXISTS {ferries} (\
             id VARCHAR(36) PRIMARY KEY,\
             ferry_name VARCHAR(128) NOT NULL,\
             ferry_code VARCHAR(32) NOT NULL,\
             ferry_type VARCHAR(64) NOT NULL,\
             passengers_capacity INTEGER NOT NULL DEFAULT 0,\
             cattle_capacity INTEGER NOT NULL DEFAULT 0,\
             rgc_capacity INTEGER NOT NULL DEFAULT 0,\
             sg_capacity INTEGER NOT NULL DEFAULT 0,\
             ppcp_capacity INTEGER NOT NULL DEFAULT 0,\
             status VARCHAR(32) NOT NULL DEFAULT 'Active'\
             )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {routes} (\
             id VARCHAR(36) PRIMARY KEY,\
             route_name VARCHAR(128) NOT NULL,\
             departure_port VARCHAR(128) NOT NULL,\
             arrival_port VARCHAR(128) NOT NULL,\
             base_price BIGINT NOT NULL DEFAULT 0,\
             duration VARCHAR(32),\
             distance_km DOUBLE PRECISION,\
             active BOOLEAN NOT NULL DEFAULT TRUE\
             )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {schedules} (\
             id VARCHAR(36) PRIMARY KEY,\
             ferry_id VARCHAR(36) NOT NULL,\
             route_id VARCHAR(36) NOT NULL,\
             departure_date VARCHAR(10),\
             departure_time VARCHAR(8) NOT NULL,\
             arrival_time VARCHAR(8) NOT NULL,\
             status VARCHAR(32) NOT NULL DEFAULT 'Scheduled'\
             )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {bookings} (\
             id VARCHAR(36) PRIMARY KEY,\
             booking_reference VARCHAR(16) NOT NULL,\
             user_id VARCHAR(64) NOT NULL,\
             passenger_name VARCHAR(128) NOT NULL,\
             passenger_email VARCHAR(128),\
             passenger_phone VARCHAR(32),\
             num_passengers INTEGER NOT NULL DEFAULT 1,\
             passenger_type VARCHAR(16) NOT NULL DEFAULT 'Economy',\
             departure_date VARCHAR(10),\
             vehicle_type VARCHAR(64),\
             vehicle_plate VARCHAR(32),\
             vehicle_weight_tons DOUBLE PRECISION,\
             vehicle_length_meters DOUBLE PRECISION,\
             cattle INTEGER NOT NULL DEFAULT 0,\
             sheep_goats INTEGER NOT NULL DEFAULT 0,\
             rice_bags INTEGER NOT NULL DEFAULT 0,\
             groundnut_bags INTEGER NOT NULL DEFAULT 0,\
             cement_bags INTEGER NOT NULL DEFAULT 0,\
             cartons INTEGER NOT NULL DEFAULT 0,\
             amount BIGINT NOT NULL,\
             currency VARCHAR(3) NOT NULL DEFAULT 'GMD',\
             payment_method VARCHAR(16),\
             payment_status VARCHAR(16) NOT NULL DEFAULT 'Pending',\
             booking_status VARCHAR(16) NOT NULL DEFAULT 'Pending',\
             ferry_id VARCHAR(36),\
             route_id VARCHAR(36),\
             schedule_id VARCHAR(36),\
             created_at TEXT NOT NULL\
             )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {payments} (\
             id VARCHAR(36) PRIMARY KEY,\
             booking_id VARCHAR(36) NOT NULL,\
             user_id VARCHAR(64) NOT NULL,\
             amount BIGINT NOT NULL,\
             currency VARCHAR(3) NOT NULL DEFAULT 'GMD',\
             method VARCHAR(16) NOT NULL DEFAULT 'Cash',\
             status VARCHAR(32) NOT NULL DEFAULT 'pending',\
             intent_id VARCHAR(64),\
             intent_data TEXT,\
             payment_link VARCHAR(512),\
             failure_reason VARCHAR(255),\
             paid_at TEXT,\
             created_at TEXT NOT NULL\
             )"
        ),
        // Reference collisions must surface as conflicts, not overwrites.
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_bookings_reference ON {bookings}(booking_reference)"
        ),
        format!("CREATE INDEX IF NOT EXISTS idx_bookings_user ON {bookings}(user_id)"),
        format!("CREATE INDEX IF NOT EXISTS idx_bookings_schedule ON {bookings}(schedule_id)"),
        format!("CREATE INDEX IF NOT EXISTS idx_bookings_created ON {bookings}(created_at)"),
        // At most one pending payment per booking and caller; this closes the
        // check-then-create race under concurrent "pay" clicks.
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_payments_pending_guard ON {payments}(booking_id, user_id) WHERE status = 'pending'"
        ),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_payments_intent ON {payments}(intent_id) WHERE intent_id IS NOT NULL"
        ),
        format!("CREATE INDEX IF NOT EXISTS idx_payments_booking ON {payments}(booking_id)"),
        format!("CREATE INDEX IF NOT EXISTS idx_payments_created ON {payments}(created_at)"),
    ];

    for ddl in ddls {
        let _ = sqlx::query(&ddl).execute(pool).await;
    }

    let _ = sqlx::query(&format!(
        "ALTER TABLE {payments} ADD COLUMN IF NOT EXISTS failure_reason VARCHAR(255)"
    ))
    .execute(pool)
    .await;
    let _ = sqlx::query(&format!(
        "ALTER TABLE {bookings} ADD COLUMN IF NOT EXISTS vehicle_plate VARCHAR(32)"
    ))
    .execute(pool)
    .await;
    let _ = sqlx::query(&format!(
        "ALTER TABLE {bookings} ADD COLUMN IF NOT EXISTS vehicle_weight_tons DOUBLE PRECISION"
    ))
    .execute(pool)
    .await;
    let _ = sqlx::query(&format!(
        "ALTER TABLE {bookings} ADD COLUMN IF NOT EXISTS vehicle_length_meters DOUBLE PRECISION"
    ))
    .execute(pool)
    .await;

    Ok(())
}
