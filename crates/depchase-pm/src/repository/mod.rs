mod array;
mod definition;
mod json;
mod traits;

pub use array::*;
pub use definition::*;
pub use json::*;
pub use traits::*;
