//! 后台任务

pub mod ab_test_worker;

pub use ab_test_worker::AbTestWorker;
