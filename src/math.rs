pub mod bessel;
pub mod mathieu;
