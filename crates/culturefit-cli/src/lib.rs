pub mod cli;
pub mod predict;
pub mod serve;
pub mod train;
pub mod util;
