//! Client-side upload form: select images, encode them, submit, show the answer

pub mod client;
pub mod form;
pub mod reader;

pub use client::GatewayClient;
pub use form::{Phase, UploadForm};
pub use reader::{read_image, read_images, ACCEPTED_MEDIA_TYPES};
