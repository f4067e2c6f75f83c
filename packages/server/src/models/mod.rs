pub mod gallery;
pub mod shared;
