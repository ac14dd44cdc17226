pub mod cars;
pub mod catalog;
pub mod pricing;
pub mod source;
