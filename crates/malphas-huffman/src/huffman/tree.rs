//! Huffman tree construction.

use super::{Code, Counter, Symbol};
use crate::heap::MinHeap;

/// One arena slot. Internal nodes always hold exactly two children.
#[derive(Debug, Clone, Copy)]
enum TreeNode {
    Leaf { symbol: Symbol },
    Internal { left: usize, right: usize },
}

/// Entry in the merge queue. Ordering is (weight, tie-break symbol); the
/// tie-break key of a subtree is the smallest symbol inside it, which makes
/// the merge order fully deterministic for a given frequency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct QueueEntry {
    weight: u64,
    tie: Symbol,
    node: usize,
}

/// A Huffman tree over an index arena.
///
/// Leaves are symbols; the path from the root (`0` left, `1` right) is the
/// symbol's raw codeword. Nodes live in a flat arena addressed by index and
/// the whole structure is discarded once the canonical table has been
/// derived from it.
#[derive(Debug)]
pub struct HuffmanTree {
    nodes: Vec<TreeNode>,
    root: Option<usize>,
}

impl HuffmanTree {
    /// Build the tree for a frequency table.
    ///
    /// Seeds one leaf per counted symbol, then repeatedly merges the two
    /// entries with the lowest (weight, tie-break) order until one remains.
    /// The child with the smaller tie-break key becomes the left child.
    pub fn from_counter(counter: &Counter) -> Self {
        let mut nodes = Vec::with_capacity(counter.distinct() * 2);
        let mut entries = Vec::with_capacity(counter.distinct());

        for (symbol, weight) in counter.entries() {
            let node = nodes.len();
            nodes.push(TreeNode::Leaf { symbol });
            entries.push(QueueEntry {
                weight,
                tie: symbol,
                node,
            });
        }

        let mut queue = MinHeap::from_vec(entries);
        while queue.len() >= 2 {
            let (Some(a), Some(b)) = (queue.pop(), queue.pop()) else {
                break;
            };
            // Pop order already puts the smaller tie first when weights
            // collide, but the left/right choice is by tie alone.
            let (left, right) = if a.tie <= b.tie { (a, b) } else { (b, a) };

            let node = nodes.len();
            nodes.push(TreeNode::Internal {
                left: left.node,
                right: right.node,
            });
            queue.push(QueueEntry {
                weight: a.weight + b.weight,
                tie: left.tie,
                node,
            });
        }

        HuffmanTree {
            nodes,
            root: queue.pop().map(|entry| entry.node),
        }
    }

    /// Extract every (symbol, raw codeword) pair.
    ///
    /// Walks the arena with an explicit stack; skewed frequency tables
    /// produce trees as deep as the alphabet, which would be unkind to the
    /// call stack. A lone leaf root gets the single-bit code `0` so that no
    /// real symbol ever carries an empty codeword.
    pub fn raw_codes(&self) -> Vec<(Symbol, Code)> {
        let Some(root) = self.root else {
            return Vec::new();
        };

        if let TreeNode::Leaf { symbol } = self.nodes[root] {
            return vec![(symbol, Code::zeros(1))];
        }

        let mut codes = Vec::new();
        let mut stack = vec![(root, Code::new())];
        while let Some((index, code)) = stack.pop() {
            match self.nodes[index] {
                TreeNode::Leaf { symbol } => codes.push((symbol, code)),
                TreeNode::Internal { left, right } => {
                    let mut left_code = code.clone();
                    left_code.push(false);
                    let mut right_code = code;
                    right_code.push(true);
                    stack.push((right, right_code));
                    stack.push((left, left_code));
                }
            }
        }
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_of(pairs: &[(Symbol, u64)]) -> Counter {
        let mut counter = Counter::new();
        for &(symbol, count) in pairs {
            counter.record_count(symbol, count);
        }
        counter
    }

    fn lengths(tree: &HuffmanTree) -> Vec<(Symbol, usize)> {
        let mut pairs: Vec<_> = tree
            .raw_codes()
            .into_iter()
            .map(|(symbol, code)| (symbol, code.len()))
            .collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_empty_counter() {
        let tree = HuffmanTree::from_counter(&Counter::new());
        assert!(tree.raw_codes().is_empty());
    }

    #[test]
    fn test_single_symbol_gets_one_bit_code() {
        let tree = HuffmanTree::from_counter(&counter_of(&[(65, 10)]));
        let codes = tree.raw_codes();
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].0, 65);
        assert_eq!(codes[0].1, Code::zeros(1));
    }

    #[test]
    fn test_classic_length_distribution() {
        // Weights 1/1/2/4: the two rarest symbols sit deepest.
        let tree = HuffmanTree::from_counter(&counter_of(&[(0, 4), (1, 2), (2, 1), (3, 1)]));
        assert_eq!(lengths(&tree), vec![(0, 1), (1, 2), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_equal_weights_are_balanced() {
        let tree = HuffmanTree::from_counter(&counter_of(&[(10, 1), (20, 1), (30, 1), (40, 1)]));
        assert_eq!(
            lengths(&tree),
            vec![(10, 2), (20, 2), (30, 2), (40, 2)]
        );
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        // All weights equal: merge order must depend only on symbol values,
        // so two builds agree bit for bit.
        let counter = counter_of(&[(5, 3), (9, 3), (1, 3), (7, 3)]);
        let first: Vec<_> = HuffmanTree::from_counter(&counter).raw_codes();
        let second: Vec<_> = HuffmanTree::from_counter(&counter).raw_codes();
        assert_eq!(first, second);
    }

    #[test]
    fn test_smaller_tie_goes_left() {
        // Two symbols: the smaller symbol takes the `0` branch.
        let tree = HuffmanTree::from_counter(&counter_of(&[(200, 5), (100, 5)]));
        let codes = tree.raw_codes();
        let mut by_symbol: Vec<_> = codes
            .into_iter()
            .map(|(symbol, code)| (symbol, code.to_string()))
            .collect();
        by_symbol.sort();
        assert_eq!(by_symbol, vec![(100, "0".to_string()), (200, "1".to_string())]);
    }

    #[test]
    fn test_deeply_skewed_tree() {
        // Fibonacci-ish weights force a maximally unbalanced tree; the
        // explicit-stack walk must handle depth ~40 without trouble.
        let mut pairs = Vec::new();
        let (mut a, mut b) = (1u64, 1u64);
        for symbol in 0..40u16 {
            pairs.push((symbol, a));
            let next = a + b;
            a = b;
            b = next;
        }
        let tree = HuffmanTree::from_counter(&counter_of(&pairs));
        let codes = tree.raw_codes();
        assert_eq!(codes.len(), 40);

        let max_len = codes.iter().map(|(_, code)| code.len()).max().unwrap();
        assert_eq!(max_len, 39);
    }

    #[test]
    fn test_internal_weights_aggregate() {
        // Total code length weighted by frequency must match the optimal
        // cost for a known example: weights 5,2,1,1 -> cost 5*1+2*2+1*3+1*3.
        let tree = HuffmanTree::from_counter(&counter_of(&[(0, 5), (1, 2), (2, 1), (3, 1)]));
        let cost: u64 = tree
            .raw_codes()
            .iter()
            .map(|(symbol, code)| {
                let weight = [5u64, 2, 1, 1][*symbol as usize];
                weight * code.len() as u64
            })
            .sum();
        assert_eq!(cost, 15);
    }
}
