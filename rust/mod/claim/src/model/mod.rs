mod attachment;
mod claim;
mod comment;
mod workflow;

pub use attachment::*;
pub use claim::*;
pub use comment::*;
pub use workflow::*;
