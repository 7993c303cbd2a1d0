pub mod common_io; // file handles, delimited lines
pub mod dmatrix_io; // reading and writing `DMatrix` tables
pub mod dmatrix_util; // sampling and stacking `DMatrix`
pub mod kdtree; // exact nearest-neighbour search under L∞
pub mod traits;
pub mod utils;
