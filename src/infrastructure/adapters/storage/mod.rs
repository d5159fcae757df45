//! Storage Adapter - 本地草稿目录

mod scratch_dir;

pub use scratch_dir::ScratchDir;
