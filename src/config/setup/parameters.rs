pub mod discretization;
pub mod domain;
pub mod physical;
