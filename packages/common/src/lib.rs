pub mod component;
pub mod error;
pub mod id_generator;
pub mod visitor;

pub use component::*;
pub use error::*;
pub use id_generator::*;
pub use visitor::*;
