//! LMDB implementation of MetaStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dpos_store::{MetaStore, StoreError};

use crate::txn::TxnScope;

pub struct LmdbMetaStore<S = Arc<Env>> {
    pub(crate) scope: S,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl<S: TxnScope> MetaStore for LmdbMetaStore<S> {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        Ok(self.scope.write(|txn| {
            self.meta_db.put(txn, key.as_bytes(), value)?;
            Ok(())
        })?)
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .scope
            .read(|txn| Ok(self.meta_db.get(txn, key.as_bytes())?.map(<[u8]>::to_vec)))?)
    }

    fn delete_meta(&self, key: &str) -> Result<(), StoreError> {
        Ok(self.scope.write(|txn| {
            self.meta_db.delete(txn, key.as_bytes())?;
            Ok(())
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::test_env::temp_env;

    #[test]
    fn schema_version_defaults_to_zero() {
        let (_dir, env) = temp_env();
        let meta = env.meta_store();
        assert_eq!(meta.get_schema_version().unwrap(), 0);
        meta.set_schema_version(3).unwrap();
        assert_eq!(meta.get_schema_version().unwrap(), 3);
    }

    #[test]
    fn delete_removes_key() {
        let (_dir, env) = temp_env();
        let meta = env.meta_store();
        meta.put_meta("genesis", b"1").unwrap();
        assert_eq!(meta.get_meta("genesis").unwrap(), Some(b"1".to_vec()));
        meta.delete_meta("genesis").unwrap();
        assert_eq!(meta.get_meta("genesis").unwrap(), None);
    }
}
