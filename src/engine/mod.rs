pub mod dedup;
pub mod priority;

pub use dedup::new_leads;
pub use priority::Priority;
