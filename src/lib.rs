pub mod output;
pub mod prepare;
pub mod shuffle;
