pub mod identity;
pub mod provision_config;
pub mod proxy;
pub mod repository;

pub use identity::{Identity, IdentityRef};
pub use provision_config::{Programs, ProvisionConfig};
pub use proxy::Proxy;
pub use repository::{Application, RepositoryDescriptor};
