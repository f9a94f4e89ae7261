//! `dsync copy` – copy one file onto pnfs and verify it.

use anyhow::{Context, Result};
use dsync_core::config::DsyncConfig;
use dsync_core::transfer::TransferRecord;
use dsync_core::{PnfsAttributeStore, TracingObserver, Transfer, TransferOptions};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Flags that take precedence over config.toml.
#[derive(Debug, Default)]
pub struct CopyOverrides {
    pub record_log: Option<PathBuf>,
    pub block_size: Option<usize>,
    pub poll_interval: Option<u64>,
    pub max_wait: Option<u64>,
    pub max_attempts: Option<u32>,
}

impl CopyOverrides {
    fn apply(&self, cfg: &DsyncConfig) -> TransferOptions {
        let mut options = TransferOptions::from_config(cfg);
        if let Some(b) = self.block_size {
            options.block_size = b;
        }
        if let Some(s) = self.poll_interval {
            options.wait.interval = Duration::from_secs(s);
        }
        if let Some(s) = self.max_wait {
            options.wait.max_wait = Duration::from_secs(s);
        }
        if self.max_attempts.is_some() {
            options.wait.max_attempts = self.max_attempts;
        }
        options
    }
}

pub async fn run_copy(
    cfg: &DsyncConfig,
    source: PathBuf,
    destination: PathBuf,
    overrides: CopyOverrides,
) -> Result<()> {
    let options = overrides.apply(cfg);
    let record_log = overrides.record_log.or_else(|| cfg.record_log.clone());
    tracing::info!(
        source = %source.display(),
        destination = %destination.display(),
        "starting copy"
    );

    // Ctrl-C flips the token; the copy loop and the size wait both honour it
    // and the orchestrator removes the partial destination.
    let cancel = options.cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling transfer");
            cancel.cancel();
        }
    });

    let result = tokio::task::spawn_blocking(move || {
        let store = PnfsAttributeStore::new();
        Transfer::new(&store, &TracingObserver, options).run(&source, &destination)
    })
    .await
    .context("transfer task failed")?;
    interrupt.abort();

    let record = result?;
    emit_record(&record, record_log.as_deref())
}

/// Append the JSON record to `record_log`, or print it to stdout.
fn emit_record(record: &TransferRecord, record_log: Option<&Path>) -> Result<()> {
    let line = record.to_json_line().context("serialize completion record")?;
    match record_log {
        Some(path) => {
            let mut f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open record log {}", path.display()))?;
            writeln!(f, "{}", line)
                .with_context(|| format!("write record log {}", path.display()))?;
            println!("{}", record);
        }
        None => println!("{}", line),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_take_precedence() {
        let cfg = DsyncConfig::default();
        let o = CopyOverrides {
            record_log: None,
            block_size: Some(4096),
            poll_interval: Some(1),
            max_wait: Some(30),
            max_attempts: Some(5),
        };
        let opts = o.apply(&cfg);
        assert_eq!(opts.block_size, 4096);
        assert_eq!(opts.wait.interval, Duration::from_secs(1));
        assert_eq!(opts.wait.max_wait, Duration::from_secs(30));
        assert_eq!(opts.wait.max_attempts, Some(5));
    }

    #[test]
    fn config_used_without_overrides() {
        let mut cfg = DsyncConfig::default();
        cfg.wait.max_attempts = Some(9);
        let opts = CopyOverrides::default().apply(&cfg);
        assert_eq!(opts.block_size, cfg.block_size);
        assert_eq!(opts.wait, cfg.wait.policy());
    }

    #[test]
    fn record_log_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("records.jsonl");
        let record = TransferRecord {
            source: PathBuf::from("/data/a"),
            destination: PathBuf::from("/pnfs/a"),
            remote_id: "0000AA".into(),
            checksum: "024d0127".into(),
            remote_checksum: "024d0127".into(),
            size: 3,
            elapsed: Duration::from_millis(10),
        };
        emit_record(&record, Some(log.as_path())).unwrap();
        emit_record(&record, Some(log.as_path())).unwrap();
        let text = std::fs::read_to_string(&log).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|l| l.contains("\"remote_id\":\"0000AA\"")));
    }
}
