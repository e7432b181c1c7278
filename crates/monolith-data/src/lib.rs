pub mod catalog;
pub mod loader;
pub mod schema;

pub use catalog::{MachineCatalog, MachineDefinition, Registries, load_machine_catalog};
pub use loader::CatalogError;
