//! Minimal host doubles shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::convert::Infallible;

use fault_core::{CpuControl, Register, RegisterFile};

/// Collects report text.
#[derive(Default)]
pub struct TextSink(pub Vec<u8>);

impl TextSink {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.clone()).unwrap()
    }
}

impl embedded_io::ErrorType for TextSink {
    type Error = Infallible;
}

impl embedded_io::Write for TextSink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Register file backed by a list of presets; records writes.
#[derive(Default)]
pub struct Registers {
    pub values: Vec<(Register, u32)>,
    pub writes: Vec<(Register, u32)>,
}

impl Registers {
    pub fn with(mut self, reg: Register, value: u32) -> Self {
        self.values.retain(|(r, _)| *r != reg);
        self.values.push((reg, value));
        self
    }
}

impl RegisterFile for Registers {
    fn read(&self, reg: Register) -> u32 {
        self.values.iter().find(|(r, _)| *r == reg).map_or(0, |(_, v)| *v)
    }

    fn write(&mut self, reg: Register, value: u32) {
        self.writes.push((reg, value));
    }
}

/// Panic payload once the terminal loop has spun long enough.
#[derive(Debug)]
pub struct Spun(pub u32);

/// CPU whose idle loop gives up after `budget` iterations.
pub struct SpinCpu {
    pub budget: u32,
    pub idles: u32,
    pub breakpoints: u32,
    pub barriers: u32,
}

impl SpinCpu {
    pub fn new(budget: u32) -> Self {
        Self {
            budget,
            idles: 0,
            breakpoints: 0,
            barriers: 0,
        }
    }
}

impl CpuControl for SpinCpu {
    fn breakpoint(&mut self) {
        self.breakpoints = self.breakpoints.saturating_add(1);
    }

    fn barrier(&mut self) {
        self.barriers = self.barriers.saturating_add(1);
    }

    fn idle(&mut self) {
        self.idles = self.idles.saturating_add(1);
        if self.idles >= self.budget {
            std::panic::panic_any(Spun(self.idles));
        }
    }
}

/// Run a diverging call and return the iteration count it was stopped at.
pub fn spin_until_stopped(f: impl FnOnce()) -> u32 {
    let payload = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).unwrap_err();
    payload.downcast_ref::<Spun>().unwrap().0
}
