pub mod amount;
pub mod csv_export;
pub mod database;
pub mod months;
pub mod store;
pub mod sync_code;

// Re-export commonly used items
pub use crate::amount::parse_amount;
pub use crate::csv_export::{default_csv_file_name, export_csv, write_csv};
pub use crate::database::{
    ensure_database_exists, read_existing_months, read_months, resolve_database_path, write_months,
};
pub use crate::months::{
    find_duplicate_month_ids, merge_months_with_deduplication, months_from_value, validate_months,
    MergeStats, SchemaError, ValidationReport,
};
pub use crate::store::{ActivityRecorder, Change, DatabaseWriter, MonthStore, StoreError, StoreObserver};
pub use crate::sync_code::{decode_sync_code, encode_sync_code, SyncCodeError};
