pub mod celebration;
pub mod recommendations;

pub use celebration::CelebrationGate;
pub use recommendations::RecommendationSync;
