//! Length-limited Huffman code construction (package-merge).
//!
//! The Larmore-Hirschberg package-merge algorithm produces, for a vector of
//! symbol weights, the code-length assignment that minimizes the weighted
//! code length subject to a hard cap on the longest code. DEFLATE needs the
//! cap twice: 15 bits for the literal/length and distance alphabets, 7 bits
//! for the code-length alphabet of dynamic block headers.
//!
//! The construction builds `max_length` levels of "packages": level 0 holds
//! one package per non-zero-weight symbol, and each higher level pairs off
//! adjacent packages of the level below (by ascending weight) and mixes the
//! original symbols back in. Selecting the cheapest `2m - 2` packages at
//! the top and expanding merged packages downward counts, for every symbol,
//! how many selected packages contain it; that count is the symbol's code
//! length.

use oxigz_core::error::{OxigzError, Result};

/// A package: a weight and the symbols it covers.
#[derive(Debug, Clone)]
struct Package {
    weight: u64,
    symbols: Vec<u16>,
}

/// Compute length-limited code lengths for `weights`.
///
/// Returns one length per input weight, `0` exactly for zero weights.
/// Symbols that do occur get lengths in `1..=max_length` satisfying the
/// Kraft-McMillan equality.
///
/// # Errors
///
/// [`OxigzError::InfeasibleCodeLength`] when more than `2^max_length`
/// symbols carry non-zero weight. On DEFLATE's alphabets (at most 288
/// symbols at 15 bits, 19 at 7 bits) this cannot occur.
///
/// # Edge cases
///
/// All-zero weights produce all-zero lengths. A single non-zero weight
/// produces a single length-1 code; encoders must still handle that
/// degenerate one-symbol code.
pub fn package_merge(weights: &[u64], max_length: u8) -> Result<Vec<u8>> {
    debug_assert!(weights.len() <= u16::MAX as usize);

    let mut lengths = vec![0u8; weights.len()];

    let mut level_zero: Vec<Package> = weights
        .iter()
        .enumerate()
        .filter(|(_, &weight)| weight > 0)
        .map(|(symbol, &weight)| Package {
            weight,
            symbols: vec![symbol as u16],
        })
        .collect();

    let num_non_zero = level_zero.len();
    if num_non_zero == 0 {
        return Ok(lengths);
    }
    if num_non_zero == 1 {
        lengths[level_zero[0].symbols[0] as usize] = 1;
        return Ok(lengths);
    }
    if (max_length as u32) < 64 && (num_non_zero as u64) > 1u64 << max_length {
        return Err(OxigzError::infeasible_code_length(num_non_zero, max_length));
    }

    level_zero.sort_by_key(|package| package.weight);

    let mut packages_by_level: Vec<Vec<Package>> = Vec::with_capacity(max_length as usize);
    packages_by_level.push(level_zero);

    for level in 1..max_length as usize {
        let previous = &packages_by_level[level - 1];
        let mut current: Vec<Package> =
            Vec::with_capacity(previous.len() / 2 + num_non_zero);

        // Pair adjacent packages by ascending weight; a trailing singleton
        // is dropped.
        let mut first = 0;
        while first + 1 < previous.len() {
            let mut symbols = previous[first].symbols.clone();
            symbols.extend_from_slice(&previous[first + 1].symbols);
            current.push(Package {
                weight: previous[first].weight + previous[first + 1].weight,
                symbols,
            });
            first += 2;
        }

        current.extend_from_slice(&packages_by_level[0]);
        current.sort_by_key(|package| package.weight);
        packages_by_level.push(current);
    }

    // Select the cheapest 2m - 2 packages at the top level, then walk down:
    // each merged package in a selection expands to two packages of the
    // level below, which are again a cheapest prefix.
    let mut num_selected = 2 * num_non_zero - 2;
    for level in (0..max_length as usize).rev() {
        let mut num_merged = 0;
        for package in &packages_by_level[level][..num_selected] {
            if package.symbols.len() > 1 {
                num_merged += 1;
            } else {
                lengths[package.symbols[0] as usize] += 1;
            }
        }
        num_selected = 2 * num_merged;
    }

    Ok(lengths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kraft_sum(lengths: &[u8]) -> f64 {
        lengths
            .iter()
            .filter(|&&length| length > 0)
            .map(|&length| 2.0f64.powi(-(length as i32)))
            .sum()
    }

    #[test]
    fn test_kraft_mcmillan_equality() {
        let weights: [u64; 17] = [1, 3, 2, 5, 8, 10, 12, 3, 5, 7, 8, 2, 3, 67, 23, 5, 3];
        let lengths = package_merge(&weights, 15).unwrap();

        assert!((kraft_sum(&lengths) - 1.0).abs() < 1e-6);
        assert!(lengths.iter().all(|&length| length <= 15));
        assert!(lengths.iter().all(|&length| length > 0));
    }

    #[test]
    fn test_infeasible_max_length() {
        let weights: [u64; 17] = [1, 3, 2, 5, 8, 10, 12, 3, 5, 7, 8, 2, 3, 67, 23, 5, 3];
        assert!(matches!(
            package_merge(&weights, 1),
            Err(OxigzError::InfeasibleCodeLength {
                symbols: 17,
                max_length: 1,
            })
        ));
    }

    #[test]
    fn test_zero_weights_excluded() {
        let weights: [u64; 6] = [0, 10, 0, 4, 7, 0];
        let lengths = package_merge(&weights, 15).unwrap();

        assert_eq!(lengths[0], 0);
        assert_eq!(lengths[2], 0);
        assert_eq!(lengths[5], 0);
        assert!(lengths[1] > 0 && lengths[3] > 0 && lengths[4] > 0);
        assert!((kraft_sum(&lengths) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_all_zero_weights() {
        let weights = [0u64; 8];
        let lengths = package_merge(&weights, 15).unwrap();
        assert!(lengths.iter().all(|&length| length == 0));
    }

    #[test]
    fn test_single_symbol_gets_length_one() {
        let mut weights = [0u64; 288];
        weights[65] = 1000;
        let lengths = package_merge(&weights, 15).unwrap();

        assert_eq!(lengths[65], 1);
        assert_eq!(lengths.iter().filter(|&&length| length > 0).count(), 1);
    }

    #[test]
    fn test_two_symbols() {
        let weights: [u64; 4] = [0, 5, 0, 100];
        let lengths = package_merge(&weights, 15).unwrap();

        assert_eq!(lengths[1], 1);
        assert_eq!(lengths[3], 1);
    }

    #[test]
    fn test_length_cap_binds() {
        // Exponential weights want a deep tree; the cap must flatten it.
        let weights: [u64; 10] = [1, 2, 4, 8, 16, 32, 64, 128, 256, 512];
        let lengths = package_merge(&weights, 5).unwrap();

        assert!(lengths.iter().all(|&length| (1..=5).contains(&length)));
        assert!((kraft_sum(&lengths) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_heavier_symbols_get_shorter_codes() {
        let weights: [u64; 5] = [100, 50, 20, 20, 10];
        let lengths = package_merge(&weights, 15).unwrap();

        assert!(lengths[0] <= lengths[1]);
        assert!(lengths[1] <= lengths[2]);
        assert!(lengths[3] <= lengths[4]);
    }

    #[test]
    fn test_matches_unconstrained_huffman_cost() {
        // With a generous cap the result must reach the Huffman optimum:
        // weights 1,1,2,3 -> optimal cost 1*3 + 1*3 + 2*2 + 3*1 = 13.
        let weights: [u64; 4] = [1, 1, 2, 3];
        let lengths = package_merge(&weights, 15).unwrap();

        let cost: u64 = weights
            .iter()
            .zip(&lengths)
            .map(|(&weight, &length)| weight * length as u64)
            .sum();
        assert_eq!(cost, 13);
    }
}
