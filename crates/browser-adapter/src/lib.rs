//! Browser capability surface consumed by the consentscope engine.
//!
//! The engine never touches a browser process directly; everything above
//! this crate speaks [`BrowserAdapter`]. A deterministic in-memory backend
//! ([`ScriptedAdapter`]) ships alongside the trait for tests and
//! integration, the same way a no-op transport fronts the real wire while a
//! driver implementation is wired in.

pub mod adapter;
pub mod events;
pub mod scripted;
pub mod scripts;

pub use adapter::{AdapterError, BrowserAdapter, SessionHandle};
pub use events::{NetworkEvent, RawCookie, RequestEvent};
pub use scripted::{ClickEffect, PageScript, ScriptedAdapter, ScriptedRequest};
