use crate::proxy::Endpoint;

#[derive(Debug)]
/// The error type for gamemode-client.
pub enum Error {
    /// Could not open a connection to the session bus.
    Connect(zbus::Error),
    /// The method call failed, either on the bus or on the remote side.
    Call {
        /// The method that was called.
        method: String,
        /// The bus name the call was sent to.
        destination: &'static str,
        /// The underlying zbus error.
        source: zbus::Error,
    },
    /// Failure to parse a reply's body.
    Parse(zbus::Error),
    /// The request was rejected by GameMode.
    Rejected,
}

impl Error {
    pub(crate) fn call(method: &str, endpoint: &Endpoint, source: zbus::Error) -> Self {
        Self::Call {
            method: method.to_owned(),
            destination: endpoint.destination,
            source,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect(e) | Self::Parse(e) | Self::Call { source: e, .. } => Some(e),
            Self::Rejected => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(e) => write!(f, "Could not connect to bus: {e}"),
            Self::Call {
                method,
                destination,
                source,
            } => {
                write!(f, "Could not call method {method} on {destination}")?;
                match source {
                    zbus::Error::MethodError(name, message, _) => {
                        write!(f, "\n\t{}", name.as_str())?;
                        match message {
                            Some(message) => write!(f, "\n\t{message}"),
                            None => Ok(()),
                        }
                    }
                    e => write!(f, "\n\t{e}"),
                }
            }
            Self::Parse(e) => write!(f, "Failure to parse response: {e}"),
            Self::Rejected => f.write_str("Request rejected by GameMode"),
        }
    }
}
