//! Plain functions returning `-1` on failure, for callers that want the
//! shape of the C client library.
//!
//! A failing call stores a diagnostic that [`error_string`] returns. The
//! diagnostic is kept per thread and is left untouched by calls that
//! succeed.
//!
//! ```rust,no_run
//! use gamemode_client::client;
//!
//! if client::request_start() < 0 {
//!     eprintln!("gamemode request failed: {}", client::error_string());
//! }
//! ```

use std::cell::RefCell;

use crate::{game_mode::GameMode, Error};

/// Longest diagnostic kept, in bytes, terminator of the C buffer included.
const ERROR_CAPACITY: usize = 512;

thread_local! {
    static LAST_ERROR: RefCell<String> = RefCell::new(String::new());
}

/// The diagnostic of the last failed call made from this thread.
pub fn error_string() -> String {
    LAST_ERROR.with(|last| last.borrow().clone())
}

fn set_error(error: &Error) {
    let mut message = error.to_string();
    if message.len() >= ERROR_CAPACITY {
        let mut end = ERROR_CAPACITY - 1;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    LAST_ERROR.with(|last| *last.borrow_mut() = message);
}

fn flatten(result: Result<i32, Error>) -> i32 {
    result.unwrap_or_else(|e| {
        set_error(&e);
        -1
    })
}

/// Register the calling process with GameMode.
pub fn request_start() -> i32 {
    flatten(GameMode::new().request_start())
}

/// Un-register the calling process from GameMode.
pub fn request_end() -> i32 {
    flatten(GameMode::new().request_end())
}

/// Query the GameMode status of the calling process.
pub fn query_status() -> i32 {
    flatten(GameMode::new().query_status())
}

/// Register the process `pid` with GameMode.
pub fn request_start_for(pid: i32) -> i32 {
    flatten(GameMode::new().request_start_for(pid))
}

/// Un-register the process `pid` from GameMode.
pub fn request_end_for(pid: i32) -> i32 {
    flatten(GameMode::new().request_end_for(pid))
}

/// Query the GameMode status of the process `pid`.
pub fn query_status_for(pid: i32) -> i32 {
    flatten(GameMode::new().query_status_for(pid))
}
