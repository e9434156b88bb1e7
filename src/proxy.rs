use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use zbus::zvariant::Type;

use crate::Error;

pub(crate) const DAEMON_DESTINATION: &str = "com.feralinteractive.GameMode";
pub(crate) const DAEMON_PATH: &str = "/com/feralinteractive/GameMode";
pub(crate) const DAEMON_INTERFACE: &str = "com.feralinteractive.GameMode";

pub(crate) const DESKTOP_DESTINATION: &str = "org.freedesktop.portal.Desktop";
pub(crate) const DESKTOP_PATH: &str = "/org/freedesktop/portal/desktop";
pub(crate) const PORTAL_INTERFACE: &str = "org.freedesktop.portal.GameMode";

/// The bus name, object path and interface of a GameMode implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// The well-known bus name.
    pub destination: &'static str,
    /// The object path.
    pub path: &'static str,
    /// The interface the methods are called on.
    pub interface: &'static str,
}

impl Endpoint {
    /// The GameMode daemon, reached directly on the session bus.
    pub const NATIVE: Endpoint = Endpoint {
        destination: DAEMON_DESTINATION,
        path: DAEMON_PATH,
        interface: DAEMON_INTERFACE,
    };

    /// The desktop portal, which forwards requests from sandboxed
    /// applications to the daemon.
    pub const PORTAL: Endpoint = Endpoint {
        destination: DESKTOP_DESTINATION,
        path: DESKTOP_PATH,
        interface: PORTAL_INTERFACE,
    };

    /// Pick the endpoint a process should talk to.
    pub fn select(sandboxed: bool) -> &'static Endpoint {
        if sandboxed {
            &Self::PORTAL
        } else {
            &Self::NATIVE
        }
    }
}

/// A way of performing a single synchronous method call.
pub trait Transport {
    /// Call `method` on `endpoint` with `body` and decode exactly one value
    /// from the reply.
    fn call<B, R>(&self, endpoint: &Endpoint, method: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + Type + Debug,
        R: DeserializeOwned + Type;
}

/// Calls over the user's session bus.
///
/// Every call opens its own connection, which is closed again once the reply
/// is decoded or the call failed. The transport's default reply timeout
/// applies.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionBus;

impl Transport for SessionBus {
    fn call<B, R>(&self, endpoint: &Endpoint, method: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + Type + Debug,
        R: DeserializeOwned + Type,
    {
        let connection = zbus::blocking::Connection::session().map_err(Error::Connect)?;
        #[cfg(feature = "tracing")]
        {
            tracing::info!(
                "Calling method {}:{} on {}",
                endpoint.interface,
                method,
                endpoint.destination
            );
            tracing::debug!("With body {:#?}", body);
        }
        let msg = connection
            .call_method(
                Some(endpoint.destination),
                endpoint.path,
                Some(endpoint.interface),
                method,
                body,
            )
            .map_err(|e| Error::call(method, endpoint, e))?;
        let reply = msg.body::<R>().map_err(Error::Parse)?;
        Ok(reply)
    }
}
