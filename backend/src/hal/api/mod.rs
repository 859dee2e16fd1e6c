mod vector;

pub use vector::*;
