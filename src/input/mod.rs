use crate::error::CcError;
use crate::peer::Peer;
use crate::tuples::Tuple;

pub mod fastq;
pub mod kronecker;

/// Which producer fills the local tuple segments at job start.
#[derive(Clone, Debug)]
pub enum InputConfig {
    Kronecker { scale: u32, edgefactor: usize, seed: u64 },
    Fastq { path: String, kmer_len: usize },
}

impl InputConfig {
    /// Collective: every peer materialises its share of the input.
    pub fn produce(&self, peer: &Peer) -> Result<Vec<Tuple>, CcError> {
        match self {
            InputConfig::Kronecker { scale, edgefactor, seed } => {
                kronecker::generate(peer, *scale, *edgefactor, *seed)
            }
            InputConfig::Fastq { path, kmer_len } => fastq::read_kmers(peer, path, *kmer_len),
        }
    }
}
