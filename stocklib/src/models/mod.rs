pub mod comparison;
pub mod ranking;
pub mod risk;
pub mod summary;

pub use comparison::*;
pub use ranking::*;
pub use risk::*;
pub use summary::*;
