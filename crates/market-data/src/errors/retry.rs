/// Classification for retry policy.
///
/// | Class | Worth another attempt? |
/// |-------|------------------------|
/// | `Never` | No, the response itself is unusable |
/// | `Transient` | Yes, the same request may succeed a moment later |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - bad symbol, malformed body, or unsupported request.
    Never,

    /// Timeout, connection failure or a 5xx-style provider error.
    Transient,
}

impl RetryClass {
    pub fn is_retryable(self) -> bool {
        matches!(self, RetryClass::Transient)
    }
}
