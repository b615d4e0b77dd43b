pub mod resolver;

pub use resolver::CatalogResolver;
