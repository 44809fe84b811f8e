//! Named-pipe pair lifecycle for local IPC.
//!
//! A [`PipeNamespace`] owns a private directory and creates `in`/`out` FIFO
//! pairs inside it:
//!
//! ```text
//! {private_dir}/{prefix}_{identity}_in
//! {private_dir}/{prefix}_{identity}_out
//! ```
//!
//! The creating side gets a [`PipePair<Creator>`]; the other process attaches
//! through [`PeerPaths`] and gets a [`PipePair<Attacher>`] with the legs
//! already swapped. Handles are non-blocking; [`Readiness`] waits for them.
//!
//! Unix only.

pub mod error;

#[cfg(unix)]
pub mod leg;
#[cfg(unix)]
pub mod namespace;
#[cfg(unix)]
pub mod pair;
#[cfg(unix)]
pub mod readiness;
#[cfg(unix)]
pub mod stream;

pub use error::{FifoError, Result, TeardownFailure, TeardownStep};

#[cfg(unix)]
pub use leg::{AccessMode, Leg};
#[cfg(unix)]
pub use namespace::{NamespaceConfig, PipeNamespace, DEFAULT_DIR_PREFIX, DEFAULT_FIFO_MODE};
#[cfg(unix)]
pub use pair::{Attacher, Creator, PairMeta, PairParts, PeerPaths, PipePair, Role};
#[cfg(unix)]
pub use readiness::{wait_ready, Interest, Readiness};
#[cfg(unix)]
pub use stream::{FifoReader, FifoWriter};
