//! Round-robin partitioning of work across worker sessions

/// Split `items` into exactly `n` chunks using index-modulo assignment
///
/// Chunk `i` holds `items[i], items[i + n], items[i + 2n], ...`. Neighbouring entries (which
/// tend to have similar names and similar sizes) therefore land on different workers. Chunk
/// sizes differ by at most one and some chunks are empty when `n > items.len()`.
///
/// # Examples
///
/// ```
/// let chunks = common::chunkify(&["a", "b", "c", "d", "e"], 2);
/// assert_eq!(chunks, vec![vec!["a", "c", "e"], vec!["b", "d"]]);
/// ```
pub fn chunkify<T: Clone>(items: &[T], n: usize) -> Vec<Vec<T>> {
    (0..n)
        .map(|i| items.iter().skip(i).step_by(n).cloned().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn names(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("dir{i}")).collect()
    }

    #[test]
    fn five_dirs_two_sessions() {
        let dirs = vec!["a", "b", "c", "d", "e"];
        let chunks = chunkify(&dirs, 2);
        assert_eq!(chunks, vec![vec!["a", "c", "e"], vec!["b", "d"]]);
    }

    #[test]
    fn more_sessions_than_dirs() {
        let chunks = chunkify(&names(3), 5);
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0], vec!["dir0"]);
        assert_eq!(chunks[1], vec!["dir1"]);
        assert_eq!(chunks[2], vec!["dir2"]);
        assert!(chunks[3].is_empty());
        assert!(chunks[4].is_empty());
    }

    #[test]
    fn empty_input_still_produces_n_chunks() {
        let chunks = chunkify::<String>(&[], 4);
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|chunk| chunk.is_empty()));
    }

    #[test]
    fn single_session_gets_everything_in_order() {
        let dirs = names(7);
        assert_eq!(chunkify(&dirs, 1), vec![dirs]);
    }

    #[test]
    fn zero_sessions_yields_no_chunks() {
        assert!(chunkify(&names(3), 0).is_empty());
    }

    proptest! {
        #[test]
        fn chunks_partition_the_input(len in 0usize..200, n in 1usize..40) {
            let dirs = names(len);
            let chunks = chunkify(&dirs, n);
            prop_assert_eq!(chunks.len(), n);
            prop_assert_eq!(chunks.iter().map(Vec::len).sum::<usize>(), len);
            let mut seen: Vec<String> = chunks.concat();
            seen.sort();
            let mut expected = dirs.clone();
            expected.sort();
            prop_assert_eq!(seen, expected);
            let longest = chunks.iter().map(Vec::len).max().unwrap_or(0);
            let shortest = chunks.iter().map(Vec::len).min().unwrap_or(0);
            prop_assert!(longest - shortest <= 1);
        }

        #[test]
        fn short_lists_leave_exactly_n_minus_l_chunks_empty(n in 1usize..40, missing in 1usize..40) {
            let len = n.saturating_sub(missing);
            let chunks = chunkify(&names(len), n);
            prop_assert_eq!(chunks.iter().filter(|chunk| chunk.is_empty()).count(), n - len);
            prop_assert_eq!(chunks.iter().filter(|chunk| chunk.len() == 1).count(), len);
        }
    }
}
