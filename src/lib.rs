//! tsuki-core: headless engine for Qt Linguist TS translation catalogs.
//!
//! Parses, validates, serializes and resolves `.ts` string catalogs with
//! length-ranked translation variants. The [`protocol`] module exposes the
//! whole surface over a line-oriented JSON protocol for a GUI frontend;
//! everything underneath is usable as a plain library.

pub mod error;
pub mod model;
pub mod parsers;
pub mod protocol;
pub mod services;

pub use error::{CoreError, CoreResult};
pub use model::catalog::{Catalog, LengthVariant, Message, Translation, TsContext};
pub use model::locale::LocaleCode;
