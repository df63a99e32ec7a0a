pub mod classifier;
pub mod key;
pub mod store;

pub use classifier::Classifier;
pub use key::StorageKey;
pub use store::{DecisionStore, DryRunStore, StoreError};
