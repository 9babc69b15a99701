//! ts-catalog
//!
//! Loader, validator and lookup engine for Qt Linguist `.ts` translation
//! catalogs.
//!
//! ```
//! use ts_catalog::{Catalog, CatalogOptions};
//!
//! let catalog = Catalog::parse(
//!     r#"<TS version="2.1" language="pl_PL">
//!     <context>
//!         <name>MainWindow</name>
//!         <message>
//!             <source>Open</source>
//!             <translation>Otwórz</translation>
//!         </message>
//!     </context>
//!     </TS>"#,
//!     CatalogOptions::default(),
//! )?;
//!
//! assert_eq!(catalog.translate("MainWindow", "Open"), "Otwórz");
//! assert_eq!(catalog.translate("MainWindow", "Close"), "Close");
//! # Ok::<(), ts_catalog::CatalogError>(())
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod input;
pub mod ir;
pub mod plural;
pub mod types;

mod test_utils;

pub use catalog::{
    Catalog,
    CatalogOptions,
    Lookup,
    MergeStrategy,
};
pub use error::CatalogError;
