//! monies-core: shared statement model, parser configuration and date/text helpers

pub mod config;
pub mod error;
pub mod model;
pub mod text;
pub mod time;

pub use config::ParserConfig;
pub use error::{ErrorKind, ParseError, Result};
pub use model::{File, Transaction};
pub use text::{decode_text, dewrap, mask_card_number};
pub use time::{fix_year, local_midnight};
