mod digest;

pub use digest::{digest_file, Digest};
