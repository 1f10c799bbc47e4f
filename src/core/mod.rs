// FILE: src/core/mod.rs
pub mod classify;
pub mod registry;

pub use classify::{classify, extension_of, Category, Classification};
pub use registry::Registry;
