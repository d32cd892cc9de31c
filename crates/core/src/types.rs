/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;
