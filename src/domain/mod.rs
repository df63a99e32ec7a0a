pub mod decision;
pub mod listing;

pub use decision::{ApplyStyle, Configuration, Decision, Reason};
pub use listing::{Listing, ListingId};
