//! Resource sub-clients. Each one only builds request descriptors and hands
//! them to the scheduler; none of them bypass admission control.

mod actions;

pub use actions::Actions;
