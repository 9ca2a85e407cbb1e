//! Grid-based potential intensity maps

pub mod column;
pub mod field;
pub mod levels;

// Re-export main types
pub use column::*;
pub use field::*;
pub use levels::*;
