// Output generation module

pub mod make;
pub mod sphinx;
pub mod templates;
pub mod writer;

pub use make::*;
pub use sphinx::*;
pub use templates::*;
pub use writer::*;
