//! Score keeping for Mâm Đền 3-6-9: a circular player queue, zero-sum
//! point transfers, fault rotation and snapshot rollback.

pub mod console;
pub mod engine;
pub mod i18n;
pub mod storage;
