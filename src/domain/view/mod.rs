pub mod collate;
pub mod column;
pub mod filter;
pub mod paginate;
pub mod selection;
pub mod sort;
pub mod summary;
pub mod tree;
