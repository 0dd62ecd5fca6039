//! In-memory hybrid index: chunk store, BM25 lexical index, exact vector
//! index, score fusion, and on-disk persistence.

pub mod hybrid;
pub mod lexical;
pub mod persist;
pub mod snapshot;
pub mod store;
pub mod vector;

pub use hybrid::{fuse, FusedHit, FusionWeights};
pub use lexical::{Bm25Params, LexicalIndex};
pub use persist::{load_snapshot, save_snapshot, DocumentEntry, IndexManifest};
pub use snapshot::{IndexBuilder, IndexSnapshot, SharedIndex};
pub use store::ChunkStore;
pub use vector::VectorIndex;
