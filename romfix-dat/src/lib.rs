pub mod catalog;
pub mod dat;
pub mod error;

pub use catalog::{Catalog, DumpStatus, Entry, Set};
pub use dat::{DatFile, DatRom, DatSet, parse_dat, parse_dat_file};
pub use error::DatError;
