//! Events Module - input signals in, handler invocations out.
//!
//! - **Dispatch** - handler table, UI events, binding dispatch
//! - **Input** - edge detection over host-polled button words

mod dispatch;
mod input;

pub use dispatch::*;
pub use input::*;
