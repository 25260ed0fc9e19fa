pub mod column;
pub mod region;
pub mod region_set;

// re-export for cleaner imports
pub use self::column::ColumnValue;
pub use self::region::Region;
pub use self::region_set::RegionSet;
