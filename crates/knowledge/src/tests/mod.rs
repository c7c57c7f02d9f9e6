//! Crate-level tests spanning chunking, embedding, indexing and generation.

mod retrieval;
