mod records;
mod view;

pub use records::{Ascent, Peak, Route};
pub use view::{
    AreaFilter, AscentView, DifficultyFilter, FilterOptions, PeakView, StarFilter, ViewRow,
};
