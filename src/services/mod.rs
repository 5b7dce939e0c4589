pub mod encoding;
pub mod names;
pub mod params;
pub mod qa;
pub mod select;
pub mod store;
pub mod writer;
