/// Background maintenance jobs
pub mod orphan_sweep;

pub use orphan_sweep::start_orphan_sweep;
