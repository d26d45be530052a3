pub(crate) mod audit;
pub(crate) mod catalog;
pub(crate) mod config;
