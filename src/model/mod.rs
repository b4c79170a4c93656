mod batch;
mod competition;
mod record;

pub use batch::*;
pub use competition::*;
pub use record::*;
