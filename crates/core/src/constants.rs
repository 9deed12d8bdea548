/// Number of policy versions kept per policy; older ones are pruned.
pub const MAX_POLICY_VERSIONS: usize = 10;

/// Unconverted quotes older than this are expired by the nightly sweep.
pub const QUOTE_EXPIRY_DAYS: i64 = 30;

/// Default retention for event-log rows.
pub const DEFAULT_LOG_RETENTION_DAYS: i64 = 90;

/// Default retention for daily backups.
pub const DEFAULT_DAILY_BACKUP_RETENTION_DAYS: i64 = 7;

/// Default retention for weekly backups.
pub const DEFAULT_WEEKLY_BACKUP_RETENTION_DAYS: i64 = 30;

/// Window covered by each error report run.
pub const ERROR_REPORT_WINDOW_MINUTES: i64 = 10;

/// Attempts made when a generated quote or policy number collides.
pub const NUMBER_GENERATION_ATTEMPTS: usize = 5;

/// Prefix of every quote number (`QI-DDMMYYYY-NNNNNN`).
pub const QUOTE_NUMBER_PREFIX: &str = "QI";

/// Prefix of every policy number (`PI-<suffix>`).
pub const POLICY_NUMBER_PREFIX: &str = "PI";

/// Payment method recorded for payments synthesized by admin conversions.
pub const ADMIN_PAYMENT_METHOD: &str = "admin";

/// Payment method recorded when a customer quote arrives already paid.
pub const DEFAULT_ONLINE_PAYMENT_METHOD: &str = "online";

/// Payment method recorded for manual entries without an explicit method.
pub const DEFAULT_MANUAL_PAYMENT_METHOD: &str = "manual";

/// Payment method recorded for card charges through Authorize.Net.
pub const GATEWAY_PAYMENT_METHOD: &str = "authorize.net";
