pub mod record_store;
pub use record_store::RecordStore;
pub mod pg_store;
pub use pg_store::PgRecordStore;
pub mod memory_store;
pub use memory_store::MemoryRecordStore;
