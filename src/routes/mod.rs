pub mod entries;
pub mod search;
