/// Identifiers handed to the core by the surrounding application (events,
/// participants). The core never allocates them.
pub type EntityId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
