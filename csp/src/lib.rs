//! # A CSP runtime for deeply embedded microcontrollers
//!
//! This crate gives application code three primitives — *processes*, *typed
//! synchronous channels*, and *guarded alternation (ALT)* — with which to
//! build static process networks that communicate by message passing rather
//! than by shared memory.
//!
//! The hard part is the rendezvous and alternation engine: the channel
//! synchronization state machine ([`chan`]), the guard protocol used by ALT
//! ([`guard`], [`alt`]), and the interaction between blocking I/O and
//! non-deterministic selection. Everything here is generic over a single
//! [`kernel::Kernel`] type parameter, which is the seam at which a concrete
//! RTOS (or, for tests and demos, a `std`-backed simulation) supplies task
//! notification, mutexes, event-bitsets, one-shot timers, and task spawn.
//!
//! Dynamic channel creation after network startup, distributed operation,
//! and timed sends/receives are all out of scope; channels have program
//! lifetime, matching the Static Process Network model.

#![no_std]

pub mod alt;
pub mod chan;
pub mod error;
pub mod guard;
pub mod kernel;
pub mod object;
pub mod process;
pub mod time;

#[cfg(feature = "log")]
pub mod log;

pub use alt::Alternative;
pub use chan::{BufReader, BufWriter, BufferedChannel, Reader, RendezvousChannel, Writer};
pub use error::{CspError, Result};
pub use kernel::Kernel;
pub use process::Process;
pub use time::Time;
