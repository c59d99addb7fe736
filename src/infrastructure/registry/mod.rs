pub mod in_memory;
pub mod registry_interface;

pub use in_memory::{InMemoryRegistry, RegistryDocument};
pub use registry_interface::Registry;
