pub mod conv;
pub mod dense;
pub mod dropout;

pub use conv::Conv2d;
pub use dense::Dense;
pub use dropout::Dropout;
