use dpos_store_lmdb::LmdbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("consensus error: {0}")]
    Consensus(#[from] dpos_consensus::ConsensusError),

    #[error("store error: {0}")]
    Store(#[from] dpos_store::StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(LmdbError),

    #[error("invalid value: {0}")]
    Types(#[from] dpos_types::TypesError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Filesystem failures keep their own variant whichever layer hit them.
impl From<LmdbError> for NodeError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::Io(io) => NodeError::Io(io),
            other => NodeError::Lmdb(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lmdb_io_failure_stays_an_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only mount");
        assert!(matches!(NodeError::from(LmdbError::Io(io)), NodeError::Io(_)));
        assert!(matches!(
            NodeError::from(LmdbError::Heed("map full".into())),
            NodeError::Lmdb(_)
        ));
    }
}
