//! Drawing: the per-frame compositor, the surfaces it draws onto, and pixel compositing.

pub mod compositor;
pub mod cpu;
pub mod frame;
pub mod mask;
pub mod surface;
