pub mod image;
pub mod sse;
