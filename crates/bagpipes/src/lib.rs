//! Named pipes in a bag.
//!
//! bagpipes connects a coordinating process and a worker process through a
//! pair of FIFOs in a private temporary directory, and frames messages on top
//! of them as a little-endian length followed by a base64 body.
//!
//! # Crate Structure
//!
//! - [`fifo`]: Private pipe namespace, FIFO pair creation/attachment, teardown
//! - [`frame`]: Wire codec, readiness-driven reader/writer, [`frame::FramedChannel`]
//!
//! # Example
//!
//! ```no_run
//! use bagpipes::fifo::PipeNamespace;
//! use bagpipes::frame::FramedChannel;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let namespace = PipeNamespace::new(7)?;
//! let mut coordinator = FramedChannel::new(namespace.create_pair("worker")?);
//!
//! // In the worker process, after receiving the coordinator's paths:
//! let peer = coordinator.peer_paths();
//! let mut worker = FramedChannel::new(PipeNamespace::attach(&peer)?);
//!
//! coordinator.send("ping")?;
//! assert_eq!(worker.recv()?.as_deref(), Some(&b"ping"[..]));
//!
//! drop(worker);
//! coordinator.teardown(namespace)?;
//! # Ok(())
//! # }
//! ```

/// Re-export FIFO lifecycle types.
pub mod fifo {
    pub use bagpipes_fifo::*;
}

/// Re-export framing types.
pub mod frame {
    pub use bagpipes_frame::*;
}
