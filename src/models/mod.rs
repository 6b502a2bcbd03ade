// src/models/mod.rs
pub mod driver;
pub mod location;
pub mod ride;
pub mod vehicle;

pub use driver::*;
pub use location::*;
pub use ride::*;
pub use vehicle::*;
