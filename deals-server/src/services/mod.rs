//! Services Module

pub mod image;

pub use image::{ImageConfig, ImageError, ImageNormalizer, NormalizedImage};
