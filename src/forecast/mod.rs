pub mod consumption;
pub mod engine;
pub mod production;
pub mod weather;

pub use consumption::*;
pub use engine::*;
pub use production::*;
pub use weather::*;
