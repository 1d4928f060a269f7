//! Terminal rendering for inventory snapshots

pub mod table;

pub use table::TableDisplay;
