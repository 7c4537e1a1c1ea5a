pub mod image;
pub mod output;
pub mod request;

pub use image::*;
pub use output::*;
pub use request::{Model, RequestOptions};
pub(crate) use request::{V3Payload, V3Response};
