//! Persistence model: sets, their files, the backend contract and the
//! staging buffer used while loading and saving.

pub mod backend;
pub mod buffer;
pub mod file;
pub mod save;
pub mod set;

pub use backend::{AccessMask, ConfigBackend};
pub use buffer::{BufferEntry, ConfigBuffer};
pub use file::{ConfigFile, FileFlags};
pub use save::{decide, SaveDecision};
pub use set::{ConfigSet, SearchPolicy, SetFlags, SetView};
