//! DDA Engine - closed-loop dynamic difficulty adjustment

pub mod core;
pub mod difficulty;
