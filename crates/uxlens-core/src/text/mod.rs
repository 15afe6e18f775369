pub mod case;
pub mod numeric;
pub mod sanitize;
