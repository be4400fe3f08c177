//! The processing logic on top of the packet representation.
//!
//! The packet *representation* lives in [`wire`]; the modules here consume
//! it. Only one layer exists in this crate: the ingress admission stage that
//! sits between frame reception and upper-layer protocol processing. It does
//! not own buffers, sockets or timers — it borrows one received frame at a
//! time and resolves it to a terminal [`Verdict`].
//!
//! [`wire`]: ../wire/index.html
//! [`Verdict`]: ingress/enum.Verdict.html

pub mod ingress;
