pub mod error;
pub mod logging;
pub mod priority;
pub mod result;

pub use error::*;
pub use logging::*;
pub use priority::*;
pub use result::*;
