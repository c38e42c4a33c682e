pub mod fir;
pub mod kernels;

pub use fir::FirFilter;
