pub mod multipart;
pub mod path;
pub mod query;
