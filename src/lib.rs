pub mod config;
pub mod element;
pub mod error;
pub mod geometry;
pub mod math;
pub mod solver;
