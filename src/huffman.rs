//! Canonical Huffman tables (§4.2 HuffmanTable).
//!
//! Built as a flat arena of nodes addressed by index rather than the
//! pointer-linked binary tree the reference decoder uses: one `Vec<Node>`
//! per table, a symbol decode walks `nodes[idx]` and follows `left`/`right`
//! indices, never touching the heap again after construction.
use crate::bitstream::BitReader;
use crate::errors::DecodeErrors;

#[derive(Debug, Clone, Copy)]
enum Node {
    Branch([Option<u32>; 2]),
    Leaf(u8),
}

#[derive(Debug, Clone)]
pub struct HuffmanTable {
    nodes: Vec<Node>,
    root: u32,
}

impl HuffmanTable {
    /// Build a table from a DHT segment's 16 length counts and its
    /// flattened symbol list, assigning codes in canonical order: shortest
    /// codes first, incrementing within a length, then shifting left when
    /// the length grows (Annex C of the standard).
    pub fn build(counts: &[u8; 16], symbols: &[u8]) -> Result<HuffmanTable, DecodeErrors> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if symbols.len() != total {
            return Err(DecodeErrors::Structural(format!(
                "Huffman table declares {total} symbols but DHT carries {}",
                symbols.len()
            )));
        }

        let mut nodes = vec![Node::Branch([None, None])];
        let root = 0u32;
        let mut code: u32 = 0;
        let mut next_symbol = symbols.iter();

        for (length_idx, &count) in counts.iter().enumerate() {
            let length = (length_idx + 1) as u32;
            for _ in 0..count {
                let symbol = *next_symbol
                    .next()
                    .expect("symbol count already checked against counts sum");
                insert(&mut nodes, root, length, code, symbol)?;
                code += 1;
            }
            code <<= 1;
        }

        Ok(HuffmanTable { nodes, root })
    }

    /// Walk the tree one bit at a time until a leaf is reached.
    pub fn decode(&self, reader: &mut BitReader) -> Result<u8, DecodeErrors> {
        let mut idx = self.root;
        loop {
            match self.nodes[idx as usize] {
                Node::Leaf(symbol) => return Ok(symbol),
                Node::Branch(children) => {
                    let bit = reader.read_bit(true)? as usize;
                    idx = children[bit].ok_or_else(|| {
                        DecodeErrors::Entropy(
                            "Huffman code has no matching path in the canonical tree".to_string(),
                        )
                    })?;
                }
            }
        }
    }
}

fn insert(
    nodes: &mut Vec<Node>,
    root: u32,
    length: u32,
    code: u32,
    symbol: u8,
) -> Result<(), DecodeErrors> {
    let mut idx = root;
    for i in (0..length).rev() {
        let bit = ((code >> i) & 1) as usize;
        let existing = match nodes[idx as usize] {
            Node::Leaf(_) => {
                return Err(DecodeErrors::Structural(
                    "Huffman table codes overlap: not a valid canonical table".to_string(),
                ))
            }
            Node::Branch(children) => children[bit],
        };
        idx = match existing {
            Some(next) => next,
            None => {
                let new_node = if i == 0 {
                    Node::Leaf(symbol)
                } else {
                    Node::Branch([None, None])
                };
                nodes.push(new_node);
                let new_idx = (nodes.len() - 1) as u32;
                if let Node::Branch(children) = &mut nodes[idx as usize] {
                    children[bit] = Some(new_idx);
                }
                new_idx
            }
        };
    }
    Ok(())
}
