use std::{
    fmt,
    fmt::{Debug, Display},
};

/// What `Debug` and `Display` print instead of the wrapped value.
const REDACTED: &str = "[redacted]";

/// A wrapper that keeps credentials out of logs.
///
/// The webhook callback verification token and the payment provider's secret API key both live behind one of these,
/// so a stray `{:?}` on a config struct can never leak them into log output. Call [`Secret::reveal`] at the point of
/// use and keep those call sites few.
#[derive(Clone, Default)]
pub struct Secret<T> {
    value: T,
}

impl<T> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl<T> From<T> for Secret<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

#[cfg(test)]
mod test {
    use super::Secret;

    #[test]
    fn debug_and_display_never_print_the_value() {
        let key: Secret<String> = "xnd_development_abc123".to_string().into();
        assert_eq!(format!("{key}"), "[redacted]");
        assert_eq!(format!("{key:?}"), "[redacted]");
    }

    #[test]
    fn reveal_returns_the_wrapped_value() {
        let token = Secret::new("callback-token".to_string());
        assert_eq!(token.reveal(), "callback-token");
    }
}
