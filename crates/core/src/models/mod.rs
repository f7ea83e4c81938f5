//! Data models for Caucus

mod admin;
mod ballot;
mod candidate;
mod position;
mod results;
mod room;
mod share_link;
mod term;
mod voter;

pub use admin::*;
pub use ballot::*;
pub use candidate::*;
pub use position::*;
pub use results::*;
pub use room::*;
pub use share_link::*;
pub use term::*;
pub use voter::*;
