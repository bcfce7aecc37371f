mod department;
mod session;
mod user;

pub use department::*;
pub use session::*;
pub use user::*;
