//! Myfxbook JSON API.
//!
//! Every response carries `error` and `message`; a failed call still
//! answers HTTP 200. The message `Invalid session.` means the token was
//! rejected, except on `login`, where it means bad credentials.

#[cfg(feature = "myfxbook")]
pub mod client;
pub mod types;
