pub mod sampler;
pub mod source;

pub use sampler::{Sampler, SamplerStats};
pub use source::{SampleSource, SineSource, WavFileSource};
