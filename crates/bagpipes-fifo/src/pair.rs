//! Pipe pairs, typed by the side that holds them.
//!
//! The creator's inbound leg is the attacher's outbound leg and vice versa.
//! Rather than trusting callers to swap paths, the attacher's view is only
//! ever produced through [`PeerPaths`], which performs the swap itself.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::stream::{FifoReader, FifoWriter};

mod sealed {
    pub trait Sealed {}
}

/// Which side of the pair a handle belongs to.
pub trait Role: sealed::Sealed {
    const NAME: &'static str;
}

/// The side that created the FIFOs and owns their directory.
#[derive(Debug)]
pub enum Creator {}

/// The side that attached to FIFOs created elsewhere.
#[derive(Debug)]
pub enum Attacher {}

impl sealed::Sealed for Creator {}
impl sealed::Sealed for Attacher {}

impl Role for Creator {
    const NAME: &'static str = "creator";
}

impl Role for Attacher {
    const NAME: &'static str = "attacher";
}

/// The attaching side's view of a pair: paths already swapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerPaths {
    inbound: PathBuf,
    outbound: PathBuf,
}

impl PeerPaths {
    /// Build the attacher's view from the creator's `(in, out)` paths, e.g.
    /// as received through process arguments.
    pub fn from_coordinator(
        coordinator_in: impl Into<PathBuf>,
        coordinator_out: impl Into<PathBuf>,
    ) -> Self {
        Self {
            inbound: coordinator_out.into(),
            outbound: coordinator_in.into(),
        }
    }

    /// Path the attacher reads from (the creator's `out` leg).
    pub fn inbound(&self) -> &Path {
        &self.inbound
    }

    /// Path the attacher writes to (the creator's `in` leg).
    pub fn outbound(&self) -> &Path {
        &self.outbound
    }

    /// The creator's `(in, out)` paths, for handing to another process.
    pub fn coordinator_paths(&self) -> (&Path, &Path) {
        (&self.outbound, &self.inbound)
    }
}

/// Paths and role of a pair, without the handles.
#[derive(Debug)]
pub struct PairMeta<R: Role> {
    inbound_path: PathBuf,
    outbound_path: PathBuf,
    _role: PhantomData<R>,
}

impl<R: Role> PairMeta<R> {
    pub(crate) fn new(inbound_path: PathBuf, outbound_path: PathBuf) -> Self {
        Self {
            inbound_path,
            outbound_path,
            _role: PhantomData,
        }
    }

    pub fn inbound_path(&self) -> &Path {
        &self.inbound_path
    }

    pub fn outbound_path(&self) -> &Path {
        &self.outbound_path
    }
}

/// A pair taken apart so its handles can be owned elsewhere.
#[derive(Debug)]
pub struct PairParts<R: Role> {
    pub meta: PairMeta<R>,
    pub inbound: FifoReader,
    pub outbound: FifoWriter,
}

/// An opened pipe pair.
#[derive(Debug)]
pub struct PipePair<R: Role> {
    meta: PairMeta<R>,
    inbound: FifoReader,
    outbound: FifoWriter,
}

impl<R: Role> PipePair<R> {
    pub(crate) fn new(meta: PairMeta<R>, inbound: FifoReader, outbound: FifoWriter) -> Self {
        Self {
            meta,
            inbound,
            outbound,
        }
    }

    pub fn inbound_path(&self) -> &Path {
        self.meta.inbound_path()
    }

    pub fn outbound_path(&self) -> &Path {
        self.meta.outbound_path()
    }

    pub fn inbound(&mut self) -> &mut FifoReader {
        &mut self.inbound
    }

    pub fn outbound(&mut self) -> &mut FifoWriter {
        &mut self.outbound
    }

    pub fn role(&self) -> &'static str {
        R::NAME
    }

    pub fn into_parts(self) -> PairParts<R> {
        PairParts {
            meta: self.meta,
            inbound: self.inbound,
            outbound: self.outbound,
        }
    }

    pub fn from_parts(parts: PairParts<R>) -> Self {
        Self::new(parts.meta, parts.inbound, parts.outbound)
    }
}

impl PipePair<Creator> {
    /// The attacher's view of this pair.
    pub fn peer_paths(&self) -> PeerPaths {
        PeerPaths::from_coordinator(self.inbound_path(), self.outbound_path())
    }
}
