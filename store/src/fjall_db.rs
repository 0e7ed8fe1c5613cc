//! On-disk database backed by fjall.
//!
//! All chain keys live in a single keyspace. Batches map onto fjall write
//! batches, which are applied atomically through the journal.

use std::path::{Path, PathBuf};

use fjall::{Database as FjallDatabase, Keyspace, KeyspaceCreateOptions, PersistMode};
use tracing::info;

use crate::database::{BatchEntry, Database};
use crate::error::StoreResult;

/// Default on-disk location used by the node.
pub const DEFAULT_DATABASE_PATH: &str = "tsvm-db";

const CHAIN_KEYSPACE: &str = "chain";

/// `Database` implementation over a fjall keyspace.
pub struct FjallDb {
    database: FjallDatabase,
    chain: Keyspace,
    path: PathBuf,
}

impl FjallDb {
    /// Open (or create) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let database = FjallDatabase::builder(&path).open()?;
        let chain = database.keyspace(CHAIN_KEYSPACE, KeyspaceCreateOptions::default)?;
        info!(path = %path.display(), "opened chain database");
        Ok(Self {
            database,
            chain,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Database for FjallDb {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.chain.get(key)?.map(|value| value.to_vec()))
    }

    fn write_batch(&mut self, batch: Vec<BatchEntry>) -> StoreResult<()> {
        let mut write = self.database.batch();
        for (key, value) in batch {
            write.insert(&self.chain, key, value);
        }
        write.commit()?;
        Ok(())
    }

    fn close(&mut self) -> StoreResult<()> {
        self.database.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}
