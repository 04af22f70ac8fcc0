pub use entrants::*;
pub use raffle::*;
pub use randomness::*;
pub use treasury::*;

pub mod entrants;
pub mod raffle;
pub mod randomness;
pub mod treasury;
