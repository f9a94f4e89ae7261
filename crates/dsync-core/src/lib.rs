//! dsync core: copy one file onto dCache/pnfs storage and verify it against
//! the Adler-32 the storage system computed, without reading the data back.

pub mod config;
pub mod logging;

pub mod attributes;
pub mod checksum;
pub mod control;
pub mod copier;
pub mod observer;
pub mod storage;
pub mod transfer;
pub mod wait;

pub use attributes::{AttributeStore, MemoryAttributeStore, PnfsAttributeStore};
pub use control::CancelToken;
pub use observer::{RecordingObserver, TracingObserver, TransferEvent, TransferObserver};
pub use transfer::{Stage, Transfer, TransferError, TransferOptions, TransferRecord};
