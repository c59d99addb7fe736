pub mod config_store;
pub mod file_ops;
pub mod provisioned_file;

pub use config_store::ConfigStore;
pub use provisioned_file::{Provisioned, ProvisionedFile};
