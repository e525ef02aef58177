// src/sync.rs
//
// Lado cliente: cache otimista dos registros do tenant, espelhado no
// servidor (HTTP) ou direto num RecordStore.

pub mod api_client;
pub mod board;
pub mod remote;

pub use api_client::ApiClient;
pub use board::ShiftBoard;
pub use remote::{RemoteStore, ScopedStore};
