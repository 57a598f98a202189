// Domain layer - Plain data types shared by the services
pub mod calls;
pub mod chart;
pub mod image_format;
pub mod text;
