// crates/gifconv-core/src/helpers/mod.rs

pub mod format;
pub mod timing;
