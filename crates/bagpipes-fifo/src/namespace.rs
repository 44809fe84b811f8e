use std::fmt;
use std::fs::Permissions;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::error::{FifoError, Result, TeardownFailure, TeardownStep};
use crate::leg::{ensure_fifo, make_fifo, AccessMode, Leg};
use crate::pair::{Attacher, Creator, PairMeta, PeerPaths, PipePair};
use crate::stream::{FifoReader, FifoWriter};

/// Default prefix for the private directory name.
pub const DEFAULT_DIR_PREFIX: &str = "bagpipes-";

/// Default permission bits for created FIFOs.
pub const DEFAULT_FIFO_MODE: u32 = 0o600;

const PRIVATE_DIR_MODE: u32 = 0o700;

/// Configuration for a [`PipeNamespace`].
#[derive(Debug, Clone)]
pub struct NamespaceConfig {
    /// Directory under which the private directory is created.
    /// Default: the system temp directory.
    pub temp_root: Option<PathBuf>,
    /// Prefix of the private directory name.
    pub dir_prefix: String,
    /// Permission bits passed to `mkfifo`.
    pub fifo_mode: u32,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            temp_root: None,
            dir_prefix: DEFAULT_DIR_PREFIX.to_string(),
            fifo_mode: DEFAULT_FIFO_MODE,
        }
    }
}

/// A private directory of named pipes plus the naming policy inside it.
///
/// The namespace exclusively owns its directory. [`PipeNamespace::teardown`]
/// removes it explicitly; dropping the namespace without a teardown removes it
/// as well (best effort).
pub struct PipeNamespace {
    dir: Option<TempDir>,
    path: PathBuf,
    identity: String,
    config: NamespaceConfig,
}

impl PipeNamespace {
    /// Allocate a private directory for pairs discriminated by `identity`.
    pub fn new(identity: impl fmt::Display) -> Result<Self> {
        Self::with_config(identity, NamespaceConfig::default())
    }

    /// Allocate a private directory with explicit configuration.
    pub fn with_config(identity: impl fmt::Display, config: NamespaceConfig) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder
            .prefix(&config.dir_prefix)
            .permissions(Permissions::from_mode(PRIVATE_DIR_MODE));
        let dir = match &config.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(FifoError::TempDir)?;

        let path = dir.path().to_path_buf();
        let identity = identity.to_string();
        debug!(?path, %identity, "allocated pipe namespace");

        Ok(Self {
            dir: Some(dir),
            path,
            identity,
            config,
        })
    }

    /// The private directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Mode used for inbound handles (before `O_NONBLOCK`).
    pub fn inbound_mode(&self) -> AccessMode {
        AccessMode::INBOUND
    }

    /// Mode used for outbound handles (before `O_NONBLOCK`).
    pub fn outbound_mode(&self) -> AccessMode {
        AccessMode::OUTBOUND
    }

    /// Path of one leg for `prefix` in this namespace.
    pub fn leg_path(&self, prefix: &str, leg: Leg) -> PathBuf {
        leg.path_in(&self.path, prefix, &self.identity)
    }

    /// Create (or re-create) the `in`/`out` FIFOs for `prefix` and open them.
    ///
    /// Existing objects at either path are replaced. The first failure aborts
    /// the operation; the second leg is not created if the first fails.
    pub fn create_pair(&self, prefix: &str) -> Result<PipePair<Creator>> {
        let inbound_path = self.leg_path(prefix, Leg::In);
        let outbound_path = self.leg_path(prefix, Leg::Out);

        let inbound = self.create_leg(&inbound_path, AccessMode::INBOUND)?;
        let outbound = self.create_leg(&outbound_path, AccessMode::OUTBOUND)?;

        info!(
            inbound = ?inbound_path,
            outbound = ?outbound_path,
            "created fifo pair"
        );

        Ok(PipePair::new(
            PairMeta::new(inbound_path, outbound_path),
            FifoReader::from_file(inbound),
            FifoWriter::from_file(outbound),
        ))
    }

    fn create_leg(&self, path: &Path, mode: AccessMode) -> Result<std::fs::File> {
        if std::fs::symlink_metadata(path).is_ok() {
            debug!(?path, "removing stale fifo");
            std::fs::remove_file(path).map_err(|source| FifoError::RemoveStale {
                path: path.to_path_buf(),
                source,
            })?;
        }
        make_fifo(path, self.config.fifo_mode)?;
        mode.open(path)
    }

    /// Open two FIFOs created by another process.
    ///
    /// `inbound` is opened for reading and `outbound` for writing, exactly as
    /// given. Prefer [`PipeNamespace::attach`], which takes pre-swapped paths.
    pub fn attach_pair(
        inbound: impl AsRef<Path>,
        outbound: impl AsRef<Path>,
    ) -> Result<PipePair<Attacher>> {
        let inbound_path = inbound.as_ref().to_path_buf();
        let outbound_path = outbound.as_ref().to_path_buf();

        ensure_fifo(&inbound_path)?;
        let inbound = AccessMode::INBOUND.open(&inbound_path)?;
        ensure_fifo(&outbound_path)?;
        let outbound = AccessMode::OUTBOUND.open(&outbound_path)?;

        debug!(
            inbound = ?inbound_path,
            outbound = ?outbound_path,
            "attached to fifo pair"
        );

        Ok(PipePair::new(
            PairMeta::new(inbound_path, outbound_path),
            FifoReader::from_file(inbound),
            FifoWriter::from_file(outbound),
        ))
    }

    /// Attach using the peer's view of a pair.
    pub fn attach(peer: &PeerPaths) -> Result<PipePair<Attacher>> {
        Self::attach_pair(peer.inbound(), peer.outbound())
    }

    /// Close both handles, unlink both FIFOs, and remove the directory.
    ///
    /// Every step is attempted; failures are collected and reported together.
    /// The directory is removed only if it is empty, so pairs created under
    /// other prefixes survive (and are reported as a `RemoveDirectory`
    /// failure). A pair created by another namespace is rejected with
    /// [`FifoError::ForeignPair`] before any step runs.
    pub fn teardown(mut self, pair: PipePair<Creator>) -> Result<()> {
        for path in [pair.inbound_path(), pair.outbound_path()] {
            if path.parent() != Some(self.path.as_path()) {
                return Err(FifoError::ForeignPair {
                    path: path.to_path_buf(),
                    namespace: self.path.clone(),
                });
            }
        }

        let parts = pair.into_parts();
        let inbound_path = parts.meta.inbound_path().to_path_buf();
        let outbound_path = parts.meta.outbound_path().to_path_buf();
        let mut failures = Vec::new();

        let steps: [(TeardownStep, &Path, std::io::Result<()>); 4] = [
            (
                TeardownStep::CloseInbound,
                inbound_path.as_path(),
                parts.inbound.close(),
            ),
            (
                TeardownStep::CloseOutbound,
                outbound_path.as_path(),
                parts.outbound.close(),
            ),
            (
                TeardownStep::UnlinkInbound,
                inbound_path.as_path(),
                std::fs::remove_file(&inbound_path),
            ),
            (
                TeardownStep::UnlinkOutbound,
                outbound_path.as_path(),
                std::fs::remove_file(&outbound_path),
            ),
        ];
        for (step, path, result) in steps {
            if let Err(source) = result {
                failures.push(TeardownFailure {
                    step,
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        if let Some(dir) = self.dir.take() {
            if let Err(source) = std::fs::remove_dir(dir.keep()) {
                failures.push(TeardownFailure {
                    step: TeardownStep::RemoveDirectory,
                    path: self.path.clone(),
                    source,
                });
            }
        }

        if failures.is_empty() {
            info!(path = ?self.path, "tore down fifo pair");
            Ok(())
        } else {
            for failure in &failures {
                warn!(%failure, "teardown step failed");
            }
            Err(FifoError::Teardown(failures))
        }
    }
}

impl Drop for PipeNamespace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            debug!(path = ?self.path, "removing pipe namespace without teardown");
            if let Err(err) = dir.close() {
                warn!(path = ?self.path, %err, "failed to remove pipe namespace");
            }
        }
    }
}

impl fmt::Debug for PipeNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeNamespace")
            .field("path", &self.path)
            .field("identity", &self.identity)
            .finish()
    }
}
