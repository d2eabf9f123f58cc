pub mod dashboard;
pub mod promtool;

pub use promtool::Promtool;
