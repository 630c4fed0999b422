pub mod grid;
pub mod local_grid;
pub mod params;
pub mod weights;

pub use grid::GlobalGrid;
pub use local_grid::LocalGrid;
pub use params::Params;
