//! UCSC chain file parser and position translation.
//!
//! A chain file describes alignments between two genome assemblies. Each
//! chain is a header line followed by alignment block lines:
//!
//! ```text
//! chain score tName tSize tStrand tStart tEnd qName qSize qStrand qStart qEnd id
//! size dt dq
//! ...
//! size
//! ```
//!
//! Positions here are 0-based, as stored in the file. Callers holding
//! 1-based coordinates convert at the boundary (see [`crate::liftover`]).

use crate::error::HarmonizeError;
use crate::parsers::{normalize_chromosome, open_file};
use crate::types::Strand;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// One contiguous aligned block, with both endpoints resolved to absolute
/// coordinates at parse time.
///
/// For minus-strand chains, `query_start` counts along the reverse strand;
/// [`Chain::translate`] converts back to forward-strand coordinates.
#[derive(Debug, Clone, Copy)]
struct AlignedBlock {
    target_start: u64,
    query_start: u64,
    size: u64,
}

/// A single chain: an alignment between a source (target) region and a
/// destination (query) region.
#[derive(Debug, Clone)]
pub struct Chain {
    pub id: u64,
    pub score: u64,
    pub target_start: u64,
    pub target_end: u64,
    pub query_name: String,
    pub query_size: u64,
    pub query_strand: Strand,
    blocks: Vec<AlignedBlock>,
}

impl Chain {
    /// Translate a 0-based source position to the destination assembly.
    ///
    /// Returns `None` when the position falls outside the chain's span or
    /// inside an alignment gap.
    pub fn translate(&self, pos: u64) -> Option<u64> {
        if pos < self.target_start || pos >= self.target_end {
            return None;
        }

        // Blocks are sorted by target_start; find the last block starting
        // at or before pos.
        let idx = self
            .blocks
            .partition_point(|b| b.target_start <= pos)
            .checked_sub(1)?;
        let block = &self.blocks[idx];
        if pos >= block.target_start + block.size {
            return None; // in the gap after this block
        }

        let offset = pos - block.target_start;
        let lifted = match self.query_strand {
            Strand::Plus => block.query_start + offset,
            Strand::Minus => self.query_size - (block.query_start + offset) - 1,
        };
        Some(lifted)
    }
}

/// A liftover candidate: one possible destination for a source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiftCandidate {
    pub chromosome: String,
    pub position: u64,
    pub strand: Strand,
}

/// All chains of a chain file, indexed by normalized source chromosome.
#[derive(Debug, Default)]
pub struct ChainSet {
    chains: HashMap<String, Vec<Chain>>,
}

impl ChainSet {
    /// Load a chain file (plain or gzip-compressed).
    pub fn from_path(path: &Path) -> Result<Self, HarmonizeError> {
        let reader = open_file(path).map_err(|e| HarmonizeError::ChainLoad {
            path: path.to_path_buf(),
            msg: e.to_string(),
        })?;
        Self::parse(reader).map_err(|msg| HarmonizeError::ChainLoad {
            path: path.to_path_buf(),
            msg,
        })
    }

    /// Parse chain data from a reader. Exposed for in-memory fixtures.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, String> {
        let mut set = ChainSet::default();
        let mut header: Option<PendingChain> = None;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("read error at line {}: {}", line_num + 1, e))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with("chain") {
                if let Some(pending) = header.take() {
                    set.insert(pending.finish());
                }
                header = Some(PendingChain::from_header(line, line_num + 1)?);
            } else if let Some(pending) = header.as_mut() {
                pending.push_block_line(line, line_num + 1)?;
            } else {
                return Err(format!(
                    "alignment data before any chain header at line {}",
                    line_num + 1
                ));
            }
        }

        if let Some(pending) = header.take() {
            set.insert(pending.finish());
        }
        Ok(set)
    }

    fn insert(&mut self, (source_name, chain): (String, Chain)) {
        self.chains
            .entry(normalize_chromosome(&source_name))
            .or_default()
            .push(chain);
    }

    /// All candidate destinations for a 0-based source position, ordered
    /// by descending chain score (ties broken by ascending chain id).
    ///
    /// This ordering makes the "first candidate wins" policy of the
    /// pipeline explicit: first means the highest-scoring chain.
    pub fn map_position(&self, chromosome: &str, pos: u64) -> Vec<LiftCandidate> {
        let key = normalize_chromosome(chromosome);
        let Some(chains) = self.chains.get(&key) else {
            return Vec::new();
        };

        let mut hits: Vec<(&Chain, u64)> = chains
            .iter()
            .filter_map(|c| c.translate(pos).map(|lifted| (c, lifted)))
            .collect();
        hits.sort_by(|(a, _), (b, _)| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));

        hits.into_iter()
            .map(|(chain, position)| LiftCandidate {
                chromosome: chain.query_name.clone(),
                position,
                strand: chain.query_strand,
            })
            .collect()
    }

    /// Total number of chains loaded.
    pub fn len(&self) -> usize {
        self.chains.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// A chain under construction: header parsed, blocks still streaming in.
struct PendingChain {
    source_name: String,
    chain: Chain,
    next_target: u64,
    next_query: u64,
}

impl PendingChain {
    fn from_header(line: &str, line_num: usize) -> Result<Self, String> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 12 {
            return Err(format!(
                "chain header at line {} has {} fields, expected at least 12",
                line_num,
                fields.len()
            ));
        }

        let num = |idx: usize, name: &str| -> Result<u64, String> {
            fields[idx]
                .parse::<u64>()
                .map_err(|_| format!("invalid {} '{}' at line {}", name, fields[idx], line_num))
        };

        let score = num(1, "score")?;
        if fields[4] != "+" {
            return Err(format!(
                "unsupported target strand '{}' at line {}",
                fields[4], line_num
            ));
        }
        let target_start = num(5, "target start")?;
        let target_end = num(6, "target end")?;
        let query_size = num(8, "query size")?;
        let query_strand = match fields[9] {
            "+" => Strand::Plus,
            "-" => Strand::Minus,
            other => {
                return Err(format!(
                    "invalid query strand '{}' at line {}",
                    other, line_num
                ))
            }
        };
        let query_start = num(10, "query start")?;
        let id = fields.get(12).and_then(|s| s.parse().ok()).unwrap_or(0);

        Ok(Self {
            source_name: fields[2].to_string(),
            chain: Chain {
                id,
                score,
                target_start,
                target_end,
                query_name: fields[7].to_string(),
                query_size,
                query_strand,
                blocks: Vec::new(),
            },
            next_target: target_start,
            next_query: query_start,
        })
    }

    fn push_block_line(&mut self, line: &str, line_num: usize) -> Result<(), String> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let size: u64 = fields[0]
            .parse()
            .map_err(|_| format!("invalid block size '{}' at line {}", fields[0], line_num))?;
        // The final block of a chain carries only a size.
        let (target_gap, query_gap) = if fields.len() >= 3 {
            let dt: u64 = fields[1].parse().map_err(|_| {
                format!("invalid target gap '{}' at line {}", fields[1], line_num)
            })?;
            let dq: u64 = fields[2].parse().map_err(|_| {
                format!("invalid query gap '{}' at line {}", fields[2], line_num)
            })?;
            (dt, dq)
        } else {
            (0, 0)
        };

        self.chain.blocks.push(AlignedBlock {
            target_start: self.next_target,
            query_start: self.next_query,
            size,
        });
        self.next_target += size + target_gap;
        self.next_query += size + query_gap;
        Ok(())
    }

    fn finish(self) -> (String, Chain) {
        (self.source_name, self.chain)
    }
}
