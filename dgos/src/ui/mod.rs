//! UI module root: exposes drawing functions for individual panels.

pub mod agents;
pub mod cpu;
pub mod disk;
pub mod header;
pub mod io;
pub mod mem;
pub mod swap;
pub mod util;
