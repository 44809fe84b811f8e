//! A framed, bidirectional channel over one pipe pair.

use std::path::Path;
use std::time::Duration;

use bagpipes_fifo::{
    Creator, FifoReader, FifoWriter, PairMeta, PairParts, PeerPaths, PipeNamespace, PipePair,
    Role,
};
use bytes::Bytes;
use tracing::debug;

use crate::codec::{Frame, FrameConfig};
use crate::error::Result;
use crate::payload::Payload;
use crate::reader::FrameReader;
use crate::writer::FrameWriter;

/// Sends frames on a pair's outbound leg and receives them on its inbound leg.
///
/// The role parameter carries through from the pair, so only the creating
/// side can tear the channel down.
pub struct FramedChannel<R: Role> {
    meta: PairMeta<R>,
    reader: FrameReader<FifoReader>,
    writer: FrameWriter<FifoWriter>,
}

impl<R: Role> FramedChannel<R> {
    /// Wrap an opened pair with default configuration.
    pub fn new(pair: PipePair<R>) -> Self {
        Self::with_config(pair, FrameConfig::default())
    }

    /// Wrap an opened pair with explicit configuration.
    pub fn with_config(pair: PipePair<R>, config: FrameConfig) -> Self {
        let PairParts {
            meta,
            inbound,
            outbound,
        } = pair.into_parts();
        debug!(
            role = R::NAME,
            inbound = ?meta.inbound_path(),
            outbound = ?meta.outbound_path(),
            "opened framed channel"
        );
        Self {
            meta,
            reader: FrameReader::with_config(inbound, config.clone()),
            writer: FrameWriter::with_config(outbound, config),
        }
    }

    /// Send one payload; see [`FrameWriter::send`].
    pub fn send<'a>(&mut self, payload: impl Into<Payload<'a>>) -> Result<Option<usize>> {
        self.writer.send(payload)
    }

    /// Receive one payload; see [`FrameReader::recv`].
    pub fn recv(&mut self) -> Result<Option<Bytes>> {
        Ok(self.reader.recv()?.map(|frame| frame.payload))
    }

    /// Receive one frame with its wire metadata.
    pub fn recv_frame(&mut self) -> Result<Option<Frame>> {
        self.reader.recv()
    }

    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.reader.set_read_timeout(timeout);
    }

    pub fn set_write_timeout(&mut self, timeout: Option<Duration>) {
        self.writer.set_write_timeout(timeout);
    }

    pub fn inbound_path(&self) -> &Path {
        self.meta.inbound_path()
    }

    pub fn outbound_path(&self) -> &Path {
        self.meta.outbound_path()
    }

    /// Give the pair back. Received bytes not yet returned as a frame are
    /// dropped.
    pub fn into_pair(self) -> PipePair<R> {
        PipePair::from_parts(PairParts {
            meta: self.meta,
            inbound: self.reader.into_inner(),
            outbound: self.writer.into_inner(),
        })
    }
}

impl FramedChannel<Creator> {
    /// The attacher's view of this channel's pair.
    pub fn peer_paths(&self) -> PeerPaths {
        PeerPaths::from_coordinator(self.inbound_path(), self.outbound_path())
    }

    /// Close the channel and remove its FIFOs and directory. See
    /// [`PipeNamespace::teardown`].
    pub fn teardown(self, namespace: PipeNamespace) -> bagpipes_fifo::Result<()> {
        namespace.teardown(self.into_pair())
    }
}
