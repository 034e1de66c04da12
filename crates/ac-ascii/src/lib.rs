/// ASCII conversion engine for asciicam.
///
/// Converts pixel frames to character grids: nearest downsampling with a
/// fixed contrast boost, plain RGB-mean luminance, linear quantization.
pub mod compositor;
pub mod quantize;
pub mod sampler;
