pub mod numeric;
pub mod one_rep_max;
pub mod summary;
pub mod volume;
pub mod week;

pub use one_rep_max::{formula_by_name, OneRepMaxFormula};
pub use summary::SummaryService;
pub use volume::{VolumeError, VolumeService, VolumeStore};
