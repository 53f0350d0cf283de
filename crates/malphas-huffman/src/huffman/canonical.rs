//! Canonical Huffman code assignment.

use malphas_core::{Error, Result};

use super::{Code, Counter, HuffmanTree, Symbol, MAX_SYMBOL, SYMBOL_COUNT};

/// A canonical code table for one file's alphabet.
///
/// Canonicalization re-labels a Huffman tree's codewords so that the whole
/// table is reconstructible from two artifacts: the alphabet sorted by
/// (code length, symbol value), and a histogram of how many symbols carry
/// each code length. Codewords of equal length come out as consecutive
/// integers, and only those two artifacts ever hit the archive; the raw
/// tree shape is build-order noise and is thrown away.
#[derive(Debug, Clone)]
pub struct CanonicalCode {
    /// Codeword per symbol, indexed by symbol value.
    codes: Vec<Option<Code>>,
    /// The alphabet in canonical (length, symbol) order.
    order: Vec<Symbol>,
    /// `length_counts[i]` symbols have code length `i + 1`. Interior zero
    /// entries are kept; the final entry is always non-zero.
    length_counts: Vec<u64>,
}

impl CanonicalCode {
    /// Derive the canonical table for a frequency table.
    pub fn from_counter(counter: &Counter) -> Self {
        let tree = HuffmanTree::from_counter(counter);
        let mut symbols = tree.raw_codes();
        symbols.sort_by(|a, b| (a.1.len(), a.0).cmp(&(b.1.len(), b.0)));

        let mut table = CanonicalCode {
            codes: vec![None; SYMBOL_COUNT],
            order: Vec::with_capacity(symbols.len()),
            length_counts: Vec::new(),
        };
        let Some((_, longest)) = symbols.last() else {
            return table;
        };
        table.length_counts = vec![0; longest.len()];

        let mut current = Code::zeros(symbols[0].1.len());
        for i in 0..symbols.len() {
            let (symbol, _) = symbols[i];
            table.codes[symbol as usize] = Some(current.clone());
            table.order.push(symbol);
            table.length_counts[current.len() - 1] += 1;

            if i + 1 < symbols.len() {
                current.increment();
                current.shift_left(symbols[i + 1].1.len() - symbols[i].1.len());
            }
        }
        table
    }

    /// Rebuild a table from the transmitted artifacts.
    ///
    /// This mirrors the generator step for step, consuming symbols from
    /// `order` with lengths implied by walking `length_counts`. Structural
    /// problems (empty alphabet, histogram/alphabet size mismatch, symbols
    /// outside the universe, duplicates) are reported as archive damage.
    pub fn from_parts(order: Vec<Symbol>, length_counts: Vec<u64>) -> Result<Self> {
        if order.is_empty() {
            return Err(Error::damaged("empty alphabet in block header"));
        }
        let total: u64 = length_counts.iter().sum();
        if total != order.len() as u64 {
            return Err(Error::damaged("can't read code sizes count"));
        }

        let Some(first_len) = length_counts.iter().position(|&count| count > 0) else {
            return Err(Error::damaged("can't start building code table"));
        };

        let mut codes: Vec<Option<Code>> = vec![None; SYMBOL_COUNT];
        let mut len_index = first_len;
        let mut count_sum = length_counts[len_index];
        let mut current = Code::zeros(len_index + 1);

        for i in 0..order.len() {
            let symbol = order[i];
            if symbol > MAX_SYMBOL {
                return Err(Error::damaged(format!(
                    "symbol {symbol} outside the alphabet"
                )));
            }
            let slot = &mut codes[symbol as usize];
            if slot.is_some() {
                return Err(Error::damaged(format!(
                    "symbol {symbol} repeated in block header"
                )));
            }
            *slot = Some(current.clone());

            if i + 1 < order.len() {
                let mut next_index = len_index;
                while (i as u64) + 1 >= count_sum {
                    next_index += 1;
                    count_sum += length_counts.get(next_index).copied().ok_or_else(|| {
                        Error::damaged("can't read code sizes count")
                    })?;
                }
                current.increment();
                current.shift_left(next_index - len_index);
                len_index = next_index;
            }
        }

        Ok(CanonicalCode {
            codes,
            order,
            length_counts,
        })
    }

    /// Number of symbols in the alphabet.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the alphabet is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The alphabet in canonical order.
    pub fn order(&self) -> &[Symbol] {
        &self.order
    }

    /// The code-length histogram, indexed from length 1.
    pub fn length_counts(&self) -> &[u64] {
        &self.length_counts
    }

    /// The codeword assigned to `symbol`, if it is in the alphabet.
    pub fn code(&self, symbol: Symbol) -> Option<&Code> {
        self.codes.get(symbol as usize).and_then(Option::as_ref)
    }

    /// Iterate over (symbol, codeword) pairs in canonical order.
    pub fn assignments(&self) -> impl Iterator<Item = (Symbol, &Code)> + '_ {
        self.order.iter().filter_map(move |&symbol| {
            self.code(symbol).map(|code| (symbol, code))
        })
    }
}
