/// Bulk exponential and logarithm.
pub mod fmath;
/// Deterministic xorshift engine.
pub mod random;
/// Annealing schedules.
pub mod schedule;
/// Disjoint set forest used by the cluster updaters.
pub mod union_find;
pub(crate) mod vec_help;

pub use random::Xorshift;
pub use schedule::{
    beta_range, make_classical_schedule_list, make_geometric_progression, make_schedule_list,
    make_transverse_field_schedule_list, ClassicalUpdaterParameter, Schedule, ScheduleEntry,
    TransverseFieldUpdaterParameter,
};
pub use union_find::UnionFind;
