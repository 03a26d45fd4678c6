// Licensed under the Apache-2.0 license

//! Shared logging abstractions for the driver kit.
//!
//! Driver types are generic over a [`Logger`] so that diagnostic output can be
//! routed to a UART (or any `embedded_io::Write` sink) in development builds
//! and compiled out entirely with [`NoOpLogger`] in production.

/// Sink for driver diagnostic messages.
///
/// Implementations must not block for unbounded time; drivers may call
/// `log` from interrupt context.
pub trait Logger {
    fn log(&mut self, args: core::fmt::Arguments<'_>);
}

/// Logger that discards all messages. The default for all driver types.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn log(&mut self, _args: core::fmt::Arguments<'_>) {}
}

/// Logger that formats messages onto any `embedded_io::Write` sink,
/// appending `\r\n` after each message. Write errors are swallowed;
/// logging must never fail the operation being logged.
pub struct WriteLogger<W: embedded_io::Write> {
    writer: W,
}

impl<W: embedded_io::Write> WriteLogger<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying sink.
    pub fn release(self) -> W {
        self.writer
    }
}

impl<W: embedded_io::Write> Logger for WriteLogger<W> {
    fn log(&mut self, args: core::fmt::Arguments<'_>) {
        struct Adapter<'a, W: embedded_io::Write>(&'a mut W);

        impl<W: embedded_io::Write> core::fmt::Write for Adapter<'_, W> {
            fn write_str(&mut self, s: &str) -> core::fmt::Result {
                self.0.write_all(s.as_bytes()).map_err(|_| core::fmt::Error)
            }
        }

        let mut adapter = Adapter(&mut self.writer);
        let _ = core::fmt::write(&mut adapter, args);
        let _ = self.writer.write_all(b"\r\n");
    }
}
