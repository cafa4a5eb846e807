//! API request handlers

mod access;
mod catalog;
mod gate;
mod health;

pub use access::*;
pub use catalog::*;
pub use gate::*;
pub use health::*;
