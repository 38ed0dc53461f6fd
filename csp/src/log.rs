//! Diagnostic logging.
//!
//! Mirrors the teacher crate's `printk!`/`printkln!` macros: a thin
//! `write_fmt`-based shim over a single global sink, rather than pulling in
//! the `log`/`defmt` facades. Deeply embedded targets rarely want two
//! logging systems fighting over the same UART, so this crate exposes one
//! sink trait and lets the host application wire it to whatever is
//! available (semihosting, a UART driver, `std::io::stderr` for tests).
//!
//! Gated behind the `log` feature; channel and ALT code calls [`csp_logln!`]
//! only at points that are useful for tracing rendezvous/ALT decisions, and
//! the macro compiles to nothing when the feature is off.

use core::fmt;

/// Destination for formatted diagnostic output.
///
/// A host environment installs one with [`set_sink`] before running any
/// process network that logs.
pub trait Sink: Sync {
    fn write_str(&self, s: &str);
}

struct NullSink;

impl Sink for NullSink {
    fn write_str(&self, _s: &str) {}
}

static NULL_SINK: NullSink = NullSink;
static mut SINK: &'static dyn Sink = &NULL_SINK;

/// Install the global log sink. Intended to be called once, early in
/// `main`, before any process runs; not synchronized against concurrent
/// logging the way a production multi-core target would need, matching
/// the teacher's single-writer-at-startup `printk` backend assumption.
///
/// # Safety
///
/// Must not be called concurrently with logging from another task.
pub unsafe fn set_sink(sink: &'static dyn Sink) {
    unsafe {
        SINK = sink;
    }
}

#[doc(hidden)]
pub fn sink() -> &'static dyn Sink {
    unsafe { SINK }
}

struct SinkWriter<'a>(&'a dyn Sink);

impl fmt::Write for SinkWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}

#[doc(hidden)]
pub fn write_fmt(args: fmt::Arguments<'_>) {
    use fmt::Write;
    let _ = SinkWriter(sink()).write_fmt(args);
}

/// Format and emit a message with no trailing newline, the way `printk!`
/// does.
#[macro_export]
macro_rules! csp_log {
    ($($arg:tt)*) => {
        $crate::log::write_fmt(format_args!($($arg)*))
    };
}

/// Format and emit a message followed by a newline, the way `printkln!`
/// does.
#[macro_export]
macro_rules! csp_logln {
    () => {
        $crate::csp_log!("\n")
    };
    ($($arg:tt)*) => {{
        $crate::csp_log!($($arg)*);
        $crate::csp_log!("\n");
    }};
}
