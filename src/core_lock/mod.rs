pub mod manager;

pub use manager::{PathLockManager, PathReadGuard, PathWriteGuard};
