/// Controls how pack handles values outside a channel's representable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecConfig {
    /// When true, out-of-range pack inputs fail with `OutOfRange`.
    /// When false, they are clamped to the nearest representable value.
    pub strict_range: bool,
}

impl CodecConfig {
    /// Config that rejects out-of-range inputs.
    pub fn strict() -> Self {
        Self { strict_range: true }
    }
}
