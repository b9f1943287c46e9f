pub mod deal;
pub mod property;
pub mod property_image;
pub mod task;
pub mod yacht;
pub mod yacht_image;
