pub mod records;
pub mod tenant;
