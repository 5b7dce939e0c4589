pub mod catalog;
pub mod locale;
