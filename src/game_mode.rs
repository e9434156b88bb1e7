//! # Examples
//!
//! ```rust,no_run
//! use gamemode_client::game_mode::{GameMode, Target};
//!
//! fn run() -> gamemode_client::Result<()> {
//!     let game_mode = GameMode::new();
//!
//!     game_mode.register(Target::Caller)?;
//!     println!("{:#?}", game_mode.status(Target::Caller)?);
//!     game_mode.unregister(Target::Caller)?;
//!
//!     Ok(())
//! }
//! ```

use std::fmt::Debug;

use serde_repr::Deserialize_repr;
use zbus::zvariant::Type;

use crate::{
    proxy::{Endpoint, SessionBus, Transport},
    sandbox::{FlatpakInfo, SandboxDetector},
    Error,
};

/// The process a request applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// The calling process.
    #[default]
    Caller,
    /// Another process, by id.
    Pid(i32),
}

/// The operations GameMode offers for a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Request GameMode to be activated.
    Register,
    /// Withdraw a previous request.
    Unregister,
    /// Ask about the current state.
    QueryStatus,
}

impl Operation {
    /// The remote method implementing the operation for `target`.
    pub fn method_name(self, target: Target) -> &'static str {
        match (self, target) {
            (Self::Register, Target::Caller) => "RegisterGame",
            (Self::Register, Target::Pid(_)) => "RegisterGameByPID",
            (Self::Unregister, Target::Caller) => "UnregisterGame",
            (Self::Unregister, Target::Pid(_)) => "UnregisterGameByPID",
            (Self::QueryStatus, Target::Caller) => "QueryStatus",
            (Self::QueryStatus, Target::Pid(_)) => "QueryStatusByPID",
        }
    }
}

#[derive(Deserialize_repr, PartialEq, Eq, Debug, Clone, Copy, Type)]
/// The status of the game mode.
#[repr(i32)]
pub enum Status {
    /// GameMode is inactive.
    Inactive = 0,
    /// GameMode is active.
    Active = 1,
    /// GameMode is active and the process is registered.
    Registered = 2,
    /// The query failed inside GameMode.
    Rejected = -1,
}

#[derive(Deserialize_repr, PartialEq, Eq, Debug, Type)]
#[repr(i32)]
/// The status of a (un-)register request.
enum RegisterStatus {
    /// If the game was successfully (un-)registered.
    Success = 0,
    /// If the request was rejected by GameMode.
    Rejected = -1,
}

/// A client of the GameMode daemon.
///
/// Every request checks whether the process runs inside a sandbox and, if
/// so, goes through the `org.freedesktop.portal.GameMode` portal instead of
/// `com.feralinteractive.GameMode`. The portal translates process ids from
/// the sandbox's pid namespace to the host's.
///
/// The caller's own process id is always sent along as the first argument;
/// requests about another process add its id as a second one.
#[derive(Debug, Clone)]
pub struct GameMode<T = SessionBus, D = FlatpakInfo> {
    transport: T,
    detector: D,
}

impl GameMode {
    /// Create a new instance of [`GameMode`] talking over the session bus.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for GameMode {
    fn default() -> Self {
        Self {
            transport: SessionBus,
            detector: FlatpakInfo::default(),
        }
    }
}

impl<T, D> GameMode<T, D>
where
    T: Transport,
    D: SandboxDetector,
{
    /// Use `transport` to reach the daemon.
    pub fn with_transport<T2: Transport>(self, transport: T2) -> GameMode<T2, D> {
        GameMode {
            transport,
            detector: self.detector,
        }
    }

    /// Use `detector` to decide between the daemon and the portal.
    pub fn with_detector<D2: SandboxDetector>(self, detector: D2) -> GameMode<T, D2> {
        GameMode {
            transport: self.transport,
            detector,
        }
    }

    /// The endpoint the next request would be sent to.
    pub fn endpoint(&self) -> &'static Endpoint {
        let sandboxed = self.detector.is_sandboxed();
        #[cfg(feature = "tracing")]
        tracing::debug!("Running sandboxed: {sandboxed}");
        Endpoint::select(sandboxed)
    }

    /// Call `method` for `target` and return the integer it replies with.
    ///
    /// The method name is not checked, unknown names are rejected by the
    /// remote side.
    pub fn request(&self, method: &str, target: Target) -> Result<i32, Error> {
        self.call(method, target)
    }

    fn call<R>(&self, method: &str, target: Target) -> Result<R, Error>
    where
        R: serde::de::DeserializeOwned + Type + Debug,
    {
        let endpoint = self.endpoint();
        let caller = std::process::id() as i32;
        let reply = match target {
            Target::Caller => self.transport.call(endpoint, method, &(caller,)),
            Target::Pid(pid) => self.transport.call(endpoint, method, &(caller, pid)),
        };
        #[cfg(feature = "tracing")]
        match &reply {
            Ok(reply) => tracing::debug!("{method} returned {reply:?}"),
            Err(e) => tracing::warn!("{e}"),
        }
        reply
    }

    fn operation<R>(&self, operation: Operation, target: Target) -> Result<R, Error>
    where
        R: serde::de::DeserializeOwned + Type + Debug,
    {
        self.call(operation.method_name(target), target)
    }

    /// Register the calling process with GameMode.
    #[doc(alias = "RegisterGame")]
    pub fn request_start(&self) -> Result<i32, Error> {
        self.operation(Operation::Register, Target::Caller)
    }

    /// Un-register the calling process from GameMode.
    #[doc(alias = "UnregisterGame")]
    pub fn request_end(&self) -> Result<i32, Error> {
        self.operation(Operation::Unregister, Target::Caller)
    }

    /// Query the GameMode status of the calling process.
    #[doc(alias = "QueryStatus")]
    pub fn query_status(&self) -> Result<i32, Error> {
        self.operation(Operation::QueryStatus, Target::Caller)
    }

    /// Register the process `pid` with GameMode.
    #[doc(alias = "RegisterGameByPID")]
    pub fn request_start_for(&self, pid: i32) -> Result<i32, Error> {
        self.operation(Operation::Register, Target::Pid(pid))
    }

    /// Un-register the process `pid` from GameMode.
    #[doc(alias = "UnregisterGameByPID")]
    pub fn request_end_for(&self, pid: i32) -> Result<i32, Error> {
        self.operation(Operation::Unregister, Target::Pid(pid))
    }

    /// Query the GameMode status of the process `pid`.
    #[doc(alias = "QueryStatusByPID")]
    pub fn query_status_for(&self, pid: i32) -> Result<i32, Error> {
        self.operation(Operation::QueryStatus, Target::Pid(pid))
    }

    /// Register a game with GameMode and thus request GameMode to be
    /// activated. Registering the same process twice fails.
    pub fn register(&self, target: Target) -> Result<(), Error> {
        match self.operation(Operation::Register, target)? {
            RegisterStatus::Success => Ok(()),
            RegisterStatus::Rejected => Err(Error::Rejected),
        }
    }

    /// Un-register a game from GameMode. GameMode is deactivated once no
    /// other game remains registered.
    ///
    /// GameMode also un-registers clients that terminate, with a small
    /// delay.
    pub fn unregister(&self, target: Target) -> Result<(), Error> {
        match self.operation(Operation::Unregister, target)? {
            RegisterStatus::Success => Ok(()),
            RegisterStatus::Rejected => Err(Error::Rejected),
        }
    }

    /// Query the GameMode status of a process.
    pub fn status(&self, target: Target) -> Result<Status, Error> {
        self.operation(Operation::QueryStatus, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::mock::{Behaviour, Recording};

    fn client(reply: i32, sandboxed: bool) -> GameMode<Recording, impl SandboxDetector> {
        GameMode::new()
            .with_transport(Recording::replying(reply))
            .with_detector(move || sandboxed)
    }

    #[test]
    fn method_names() {
        let pid = Target::Pid(42);
        assert_eq!(Operation::Register.method_name(Target::Caller), "RegisterGame");
        assert_eq!(Operation::Register.method_name(pid), "RegisterGameByPID");
        assert_eq!(Operation::Unregister.method_name(Target::Caller), "UnregisterGame");
        assert_eq!(Operation::Unregister.method_name(pid), "UnregisterGameByPID");
        assert_eq!(Operation::QueryStatus.method_name(Target::Caller), "QueryStatus");
        assert_eq!(Operation::QueryStatus.method_name(pid), "QueryStatusByPID");
    }

    #[test]
    fn returns_reply() {
        let game_mode = client(2, false);
        assert_eq!(game_mode.request_start().unwrap(), 2);
        assert_eq!(game_mode.request_end().unwrap(), 2);
        assert_eq!(game_mode.query_status().unwrap(), 2);
        assert_eq!(game_mode.request_start_for(1234).unwrap(), 2);
        assert_eq!(game_mode.request_end_for(1234).unwrap(), 2);
        assert_eq!(game_mode.query_status_for(1234).unwrap(), 2);

        let methods = game_mode
            .transport
            .calls()
            .into_iter()
            .map(|call| call.method)
            .collect::<Vec<_>>();
        assert_eq!(
            methods,
            [
                "RegisterGame",
                "UnregisterGame",
                "QueryStatus",
                "RegisterGameByPID",
                "UnregisterGameByPID",
                "QueryStatusByPID",
            ]
        );
    }

    #[test]
    fn caller_sends_own_pid_only() {
        let game_mode = client(0, false);
        game_mode.request_start().unwrap();

        let call = game_mode.transport.last();
        assert_eq!(call.signature, "i");
        let pid = std::process::id() as i32;
        assert_eq!(call.body, pid.to_le_bytes());
    }

    #[test]
    fn pid_sends_caller_and_target() {
        let game_mode = client(0, false);
        game_mode.request_start_for(4321).unwrap();

        let call = game_mode.transport.last();
        assert_eq!(call.signature, "ii");
        let mut body = (std::process::id() as i32).to_le_bytes().to_vec();
        body.extend_from_slice(&4321i32.to_le_bytes());
        assert_eq!(call.body, body);
    }

    #[test]
    fn endpoint_follows_sandbox() {
        let native = client(0, false);
        native.query_status().unwrap();
        assert_eq!(native.transport.last().endpoint, Endpoint::NATIVE);

        let portal = client(0, true);
        portal.query_status().unwrap();
        assert_eq!(portal.transport.last().endpoint, Endpoint::PORTAL);
    }

    #[test]
    fn sandbox_checked_on_every_request() {
        use std::cell::Cell;

        let sandboxed = Cell::new(false);
        let game_mode = GameMode::new()
            .with_transport(Recording::replying(1))
            .with_detector(|| sandboxed.get());

        game_mode.query_status().unwrap();
        sandboxed.set(true);
        game_mode.query_status().unwrap();

        let endpoints = game_mode
            .transport
            .calls()
            .into_iter()
            .map(|call| call.endpoint)
            .collect::<Vec<_>>();
        assert_eq!(endpoints, [Endpoint::NATIVE, Endpoint::PORTAL]);
    }

    #[test]
    fn query_is_stable() {
        let game_mode = client(1, false);
        assert_eq!(
            game_mode.query_status().unwrap(),
            game_mode.query_status().unwrap()
        );
    }

    #[test]
    fn unknown_method_is_forwarded() {
        let game_mode = client(0, false);
        assert_eq!(game_mode.request("NotAMethod", Target::Caller).unwrap(), 0);
        assert_eq!(game_mode.transport.last().method, "NotAMethod");
    }

    #[test]
    fn connection_failure() {
        let game_mode = GameMode::new()
            .with_transport(Recording::new(Behaviour::NoBus(
                "No such file or directory".to_owned(),
            )))
            .with_detector(|| false);

        let err = game_mode.query_status_for(12).unwrap_err();
        assert!(matches!(err, Error::Connect(_)));
        assert!(err.to_string().contains("No such file or directory"));
        assert!(game_mode.transport.calls().is_empty());
    }

    #[test]
    fn call_failure() {
        let game_mode = GameMode::new()
            .with_transport(Recording::new(Behaviour::Fail("Access denied".to_owned())))
            .with_detector(|| true);

        let err = game_mode.request_start().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("RegisterGame"));
        assert!(message.contains("org.freedesktop.portal.Desktop"));
        assert!(message.contains("Access denied"));
    }

    #[test]
    fn empty_reply() {
        let game_mode = GameMode::new()
            .with_transport(Recording::new(Behaviour::Reply(Vec::new())))
            .with_detector(|| false);

        let err = game_mode.query_status().unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().starts_with("Failure to parse response"));
    }

    #[test]
    fn typed_replies() {
        assert_eq!(client(2, false).status(Target::Caller).unwrap(), Status::Registered);
        assert_eq!(client(0, false).status(Target::Pid(7)).unwrap(), Status::Inactive);
        assert_eq!(client(-1, false).status(Target::Caller).unwrap(), Status::Rejected);
        assert!(matches!(
            client(5, false).status(Target::Caller),
            Err(Error::Parse(_))
        ));

        assert!(client(0, false).register(Target::Caller).is_ok());
        assert!(matches!(
            client(-1, false).register(Target::Pid(7)),
            Err(Error::Rejected)
        ));
        assert!(client(0, true).unregister(Target::Pid(7)).is_ok());
        assert!(matches!(
            client(-1, true).unregister(Target::Caller),
            Err(Error::Rejected)
        ));
    }
}
