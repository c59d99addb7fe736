pub mod maven;
pub mod settings;

pub use maven::Maven;
pub use settings::MavenSettings;
