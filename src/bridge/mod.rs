// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the sole public-facing API of the cloudpack library. It provides a
// stable interface over the pure `pipeline` engine and owns the on-wire constants
// shared by the container codec and the Huffman tree serializer.
//
// Data Flow (Compression):
//
//   1. [Stateless API (compress)]           -> Receives `&PointCloud` + `&CompressOptions`
//         |
//         `-> calls the pure engine ->
//
//   2. [Pipeline Engine (pipeline::orchestrator)] -> sort, delta, entropy-code, frame
//         |
//         `-> Returns `Result<Vec<u8>>` (a serialized container)
//
//
// Data Flow (Decompression):
//
//   1. [Stateless API (uncompress)]         -> Receives `&[u8]`
//         |
//         `-> [Pipeline Engine] parse, decode, inverse delta, inverse permute
//         |
//         `-> Returns `Result<PointCloud>`
//
//   Inspection (`analyze_container`) only parses the framing and never decodes
//   the payload symbols.
//
// ====================================================================================
pub mod format;
pub mod stateless_api;

// --- Stateless API ---
pub use stateless_api::{
    analyze_container, check_compression, compress, enable_verbose_logging, uncompress,
};

// --- Format Structs ---
pub use format::{ContainerStats, HuffmanStats};
