/// User-facing classification of a [`MarketDataError`](super::MarketDataError).
///
/// The analytics boundary reports failures in terms of these kinds; the
/// transport-level variants fold into [`ErrorKind::Provider`].
///
/// | Kind | Meaning |
/// |------|---------|
/// | `NotFound` | Resolution exhausted every strategy |
/// | `MalformedResponse` | Payload shape unrecognized or status not success |
/// | `ConfigMissing` | Required credential or key absent |
/// | `Computation` | Arithmetic guard tripped (e.g. zero spot price) |
/// | `Provider` | Transport, rate limiting or unsupported operation |
/// | `Storage` | Mapping store could not be read or written |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    NotFound,
    MalformedResponse,
    ConfigMissing,
    Computation,
    Provider,
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::MalformedResponse => "MALFORMED_RESPONSE",
            Self::ConfigMissing => "CONFIG_MISSING",
            Self::Computation => "COMPUTATION",
            Self::Provider => "PROVIDER",
            Self::Storage => "STORAGE",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
