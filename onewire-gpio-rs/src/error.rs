#[derive(Debug, PartialEq, Eq)]
/// Represents errors that can occur while driving the 1-Wire line.
pub enum Error<E> {
    /// The platform refused to configure the line for open-drain operation.
    /// The handle is never created in this case.
    Configuration(E),
    /// An error occurred while toggling or sampling an already configured line.
    Line(E),
}

impl<E> Error<E> {
    /// Returns the underlying platform error.
    pub fn into_inner(self) -> E {
        match self {
            Error::Configuration(e) | Error::Line(e) => e,
        }
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Configuration(e) => write!(f, "line configuration rejected: {e:?}"),
            Error::Line(e) => write!(f, "line access failed: {e:?}"),
        }
    }
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Line(e)
    }
}
