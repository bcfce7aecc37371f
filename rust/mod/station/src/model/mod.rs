mod entry;
mod kpi;
mod station;

pub use entry::*;
pub use kpi::*;
pub use station::*;
