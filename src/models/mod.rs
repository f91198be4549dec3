pub mod lesson;
pub mod loaders;
pub mod value;

pub use lesson::{LessonRecord, LessonSeed, ScreenRecord};
pub use loaders::load_seed_file;
pub use value::{FieldValue, Fields};
