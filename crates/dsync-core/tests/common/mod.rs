pub mod pnfs_dir;
