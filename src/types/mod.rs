pub mod cash;
pub mod contract;
pub mod position;
pub mod requests;
pub mod summary;

pub use cash::*;
pub use contract::*;
pub use position::*;
pub use requests::*;
pub use summary::*;
