pub mod macros;

pub mod filter;
pub mod health;
pub mod opportunity;
pub mod pending;

pub use filter::*;
pub use health::*;
pub use opportunity::*;
pub use pending::*;
