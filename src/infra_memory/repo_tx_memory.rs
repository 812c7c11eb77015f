use crate::domain_port::{StorageTx, TxManager};

// Minimal fake transaction for the in-memory backend: writes apply
// immediately and rollback is a no-op. Good enough for tests and demos;
// transactional semantics are exercised against the MySQL backend.
pub struct MemoryTxManager;

impl MemoryTxManager {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MemoryTxManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TxManager for MemoryTxManager {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>> {
        Ok(Box::new(MemoryTx))
    }
}

pub struct MemoryTx;

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for MemoryTx {
    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}
