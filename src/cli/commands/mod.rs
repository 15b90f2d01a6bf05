pub mod assessment;
pub mod migrate;
pub mod staff;
pub mod tokens;
