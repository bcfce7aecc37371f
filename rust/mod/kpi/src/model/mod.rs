mod action;
mod calendar;
mod chart;
mod dashboard;
mod kpi;

pub use action::*;
pub use calendar::*;
pub use chart::*;
pub use dashboard::*;
pub use kpi::*;
