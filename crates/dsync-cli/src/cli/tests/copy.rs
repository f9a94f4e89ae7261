//! Tests for the copy subcommand.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_copy() {
    match parse(&["dsync", "copy", "/data/file.dat", "/pnfs/example.org/file.dat"]) {
        CliCommand::Copy {
            source,
            destination,
            record_log,
            block_size,
            poll_interval,
            max_wait,
            max_attempts,
        } => {
            assert_eq!(source, Path::new("/data/file.dat"));
            assert_eq!(destination, Path::new("/pnfs/example.org/file.dat"));
            assert!(record_log.is_none());
            assert!(block_size.is_none());
            assert!(poll_interval.is_none());
            assert!(max_wait.is_none());
            assert!(max_attempts.is_none());
        }
        _ => panic!("expected Copy"),
    }
}

#[test]
fn cli_parse_copy_all_flags() {
    match parse(&[
        "dsync",
        "copy",
        "a",
        "b",
        "--record-log",
        "/var/log/dsync.jsonl",
        "--block-size",
        "65536",
        "--poll-interval",
        "2",
        "--max-wait",
        "60",
        "--max-attempts",
        "10",
    ]) {
        CliCommand::Copy {
            record_log,
            block_size,
            poll_interval,
            max_wait,
            max_attempts,
            ..
        } => {
            assert_eq!(record_log.as_deref(), Some(Path::new("/var/log/dsync.jsonl")));
            assert_eq!(block_size, Some(65536));
            assert_eq!(poll_interval, Some(2));
            assert_eq!(max_wait, Some(60));
            assert_eq!(max_attempts, Some(10));
        }
        _ => panic!("expected Copy with flags"),
    }
}

#[test]
fn cli_copy_requires_both_paths() {
    assert!(Cli::try_parse_from(["dsync", "copy", "only-source"]).is_err());
    assert!(Cli::try_parse_from(["dsync", "copy"]).is_err());
}

#[test]
fn cli_copy_rejects_non_numeric_block_size() {
    assert!(Cli::try_parse_from(["dsync", "copy", "a", "b", "--block-size", "big"]).is_err());
}
