pub mod macros;

pub mod analytics;
pub mod pagination;
pub mod schedule;
pub mod status;
pub mod task;
pub mod visit;

crate::define_id_type!(ScheduleId);
crate::define_id_type!(VisitId);
crate::define_id_type!(TaskId);

pub use analytics::*;
pub use pagination::*;
pub use schedule::*;
pub use status::*;
pub use task::*;
pub use visit::*;
