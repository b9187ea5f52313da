pub mod battery;
pub mod engine;
pub mod equity;
pub mod grid;
pub mod load;
pub mod matching;
pub mod network;
pub mod pricing;
pub mod types;

pub use battery::*;
pub use engine::*;
pub use equity::*;
pub use grid::*;
pub use load::*;
pub use matching::*;
pub use network::*;
pub use pricing::*;
pub use types::*;
