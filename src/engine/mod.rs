pub mod normalize;
pub mod sampler;
pub mod segment;
