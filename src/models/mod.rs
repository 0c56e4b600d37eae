pub mod entry;

pub use entry::{EntryChanges, EntryFilter, EntryPage, VisitorEntry};
