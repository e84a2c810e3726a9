//! Request timeouts

use std::time::Duration;

/// Default timeout: 5 seconds for each phase
pub const DEFAULT_TIMEOUT: Timeout = Timeout::Total(Duration::from_secs(5));

/// How long to wait for the server before giving up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeout {
    /// Same limit for the connect phase and the read phase
    Total(Duration),
    /// Separate connect and read limits
    Split { connect: Duration, read: Duration },
}

impl Timeout {
    pub fn split(connect: Duration, read: Duration) -> Self {
        Timeout::Split { connect, read }
    }

    pub fn connect(&self) -> Duration {
        match self {
            Timeout::Total(d) => *d,
            Timeout::Split { connect, .. } => *connect,
        }
    }

    pub fn read(&self) -> Duration {
        match self {
            Timeout::Total(d) => *d,
            Timeout::Split { read, .. } => *read,
        }
    }
}

impl Default for Timeout {
    fn default() -> Self {
        DEFAULT_TIMEOUT
    }
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        Timeout::Total(d)
    }
}

impl From<(Duration, Duration)> for Timeout {
    fn from((connect, read): (Duration, Duration)) -> Self {
        Timeout::Split { connect, read }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_applies_to_both_phases() {
        let t = Timeout::from(Duration::from_secs(3));
        assert_eq!(t.connect(), Duration::from_secs(3));
        assert_eq!(t.read(), Duration::from_secs(3));
    }

    #[test]
    fn test_pair_applies_separately() {
        let t = Timeout::from((Duration::from_secs(1), Duration::from_secs(10)));
        assert_eq!(t.connect(), Duration::from_secs(1));
        assert_eq!(t.read(), Duration::from_secs(10));
    }

    #[test]
    fn test_default_is_five_seconds() {
        assert_eq!(Timeout::default(), Timeout::Total(Duration::from_secs(5)));
    }
}
