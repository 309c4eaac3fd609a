mod entry;
mod processed;
mod resolution;
mod scope;
mod summary;

pub use entry::*;
pub use processed::*;
pub use resolution::*;
pub use scope::*;
pub use summary::*;
