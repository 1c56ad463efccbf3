pub mod numeric;

pub use numeric::{numbers_from_value, parse_counts, parse_value, parse_values, to_number};
