use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use alloy::primitives::Address;
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use super::InterfaceDescription;
use crate::error::ResolutionError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AbiSource: Send + Sync {
    /// Fetches the raw ABI text for `address` from upstream.
    async fn fetch(&self, address: Address) -> Result<String, ResolutionError>;
}

/// Append-only on-disk ABI store. An entry, once written, is never refreshed.
pub struct AbiCache {
    dir: PathBuf,
    source: Arc<dyn AbiSource>,
}

impl AbiCache {
    pub const DEFAULT_DIR: &'static str = "abis";

    pub fn new(dir: impl Into<PathBuf>, source: Arc<dyn AbiSource>) -> Self {
        Self {
            dir: dir.into(),
            source,
        }
    }

    pub fn path_for(&self, address: Address) -> PathBuf {
        self.dir
            .join(format!("ABI-{}.json", address.to_string().to_lowercase()))
    }

    pub async fn resolve(&self, address: Address) -> Result<InterfaceDescription, ResolutionError> {
        let path = self.path_for(address);

        match fs::read_to_string(&path).await {
            Ok(text) => {
                debug!(%address, path = %path.display(), "found cached abi");
                return Ok(InterfaceDescription::new(text));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(ResolutionError::Io { path, source }),
        }

        let description = InterfaceDescription::new(self.source.fetch(address).await?);
        description
            .parse()
            .map_err(|source| ResolutionError::Unusable { address, source })?;

        self.store(&path, description.as_str()).await?;
        info!(%address, path = %path.display(), "wrote abi to cache");

        Ok(description)
    }

    // Entries appear whole: staged next to the target, then renamed over it.
    async fn store(&self, path: &Path, text: &str) -> Result<(), ResolutionError> {
        let io_err = |source: io::Error| ResolutionError::Io {
            path: path.to_path_buf(),
            source,
        };

        fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, text).await.map_err(io_err)?;
        fs::rename(&staging, path).await.map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use mockall::predicate;

    const ABI: &str = r#"[{"type":"function","name":"tokenURI","inputs":[{"name":"tokenId","type":"uint256"}],"outputs":[{"name":"","type":"string"}],"stateMutability":"view"}]"#;
    const NFT: Address = address!("9c8ff314c9bc7f6e59a9d9225fb22946427edc03");

    #[tokio::test]
    async fn second_resolution_is_served_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = MockAbiSource::new();
        source
            .expect_fetch()
            .with(predicate::eq(NFT))
            .times(1)
            .returning(|_| Ok(ABI.to_string()));

        let cache = AbiCache::new(dir.path().join("abis"), Arc::new(source));

        let first = cache.resolve(NFT).await.unwrap();
        let second = cache.resolve(NFT).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.as_str(), ABI);
        assert_eq!(std::fs::read_to_string(cache.path_for(NFT)).unwrap(), ABI);
    }

    #[test]
    fn entries_are_keyed_by_lowercase_address() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AbiCache::new(dir.path(), Arc::new(MockAbiSource::new()));

        assert_eq!(
            cache.path_for(NFT).file_name().unwrap(),
            "ABI-0x9c8ff314c9bc7f6e59a9d9225fb22946427edc03.json"
        );
    }

    #[tokio::test]
    async fn existing_entry_never_touches_upstream() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = MockAbiSource::new();
        source.expect_fetch().never();

        let cache = AbiCache::new(dir.path(), Arc::new(source));
        std::fs::write(cache.path_for(NFT), "[]").unwrap();

        assert_eq!(cache.resolve(NFT).await.unwrap().as_str(), "[]");
    }

    #[tokio::test]
    async fn unusable_description_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = MockAbiSource::new();
        source
            .expect_fetch()
            .times(2)
            .returning(|_| Ok("Contract source code not verified".to_string()));

        let cache = AbiCache::new(dir.path(), Arc::new(source));

        for _ in 0..2 {
            let err = cache.resolve(NFT).await.unwrap_err();
            assert!(matches!(err, ResolutionError::Unusable { address, .. } if address == NFT));
        }
        assert!(!cache.path_for(NFT).exists());
    }

    #[tokio::test]
    async fn upstream_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = MockAbiSource::new();
        source.expect_fetch().returning(|address| {
            Err(ResolutionError::Upstream {
                address,
                message: "NOTOK".to_string(),
                result: "Invalid API Key".to_string(),
            })
        });

        let cache = AbiCache::new(dir.path(), Arc::new(source));

        assert!(matches!(
            cache.resolve(NFT).await,
            Err(ResolutionError::Upstream { .. })
        ));
        assert!(!cache.path_for(NFT).exists());
    }
}
