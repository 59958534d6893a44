mod record;
mod strict;

pub use record::*;
pub use strict::StrictQuotes;
