pub mod forecast;
pub mod household;
pub mod trade;
pub mod weather;

pub use forecast::*;
pub use household::*;
pub use trade::*;
pub use weather::*;
