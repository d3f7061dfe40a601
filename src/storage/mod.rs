mod store;

pub use store::{FlightEntry, Storage, StorageError, StoredSample};
