#![allow(clippy::useless_conversion)]

pub mod deal;
pub mod ids;
pub mod property;
pub mod task;
pub mod yacht;
