//! Free-function algorithms over the mixed graph: path search, separation
//! semantics, tier layering, and graph comparison.
pub mod compare;
pub mod paths;
pub mod separation;
pub mod tiers;

pub use compare::{compare, EdgeRecord, GraphComparison};
pub use paths::{
    all_paths, directed_paths, exists_directed_path, exists_semi_directed_path, exists_trek,
    semi_directed_paths, treks,
};
pub use separation::{d_connecting_paths, d_separated, is_d_connected_to};
pub use tiers::{tier_ordering, tiers};
