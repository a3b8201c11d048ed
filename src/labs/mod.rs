// AI content labs; UI-free state machines driven once per frame

pub mod image;
pub mod video;

pub use image::{ImageLab, ImageMode};
pub use video::{VideoLab, BILLING_URL, PROGRESS_MESSAGES};
