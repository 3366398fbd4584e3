//! HTTP control & status facade.
//!
//! ```text
//!   TCP socket ──▶ server (≤1 request per tick)
//!                    │ request line + query
//!                    ▼
//!                  router ──▶ AppService commands / queries
//!                    │
//!                    ▼
//!            page + template (closed-map substitution)
//! ```
//!
//! The server accepts at most one connection per control tick and handles
//! it to completion before returning — no pipelining, no concurrency, no
//! locking.  Mutating routes answer `303 See Other` with `Location: /` so
//! a browser refresh never replays a command.

pub mod page;
pub mod router;
pub mod server;
pub mod template;
