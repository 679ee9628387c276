pub mod artwork;
pub mod posters;
pub mod providers;
pub mod recommendations;

pub use artwork::PosterResolver;
pub use posters::{PosterFetcher, PosterSource, ProgressObserver};
pub use recommendations::{RecommendationEngine, Recommendations};
