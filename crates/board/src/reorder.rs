//! Drag-reorder sequencing over explicitly ordered lists.
//!
//! A drag gesture reduces to (source index, destination index). The moved
//! item is spliced into the destination position and every item is
//! renumbered to its new 1-based position, so display orders always form the
//! dense sequence 1..=N. The full id-to-position batch is returned for
//! persistence in a single request.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("index {index} out of range for list of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("unknown item id {0}")]
    UnknownId(Uuid),
    #[error("duplicate item id {0}")]
    DuplicateId(Uuid),
    #[error("ordering must cover exactly {expected} items, got {actual}")]
    WrongCount { expected: usize, actual: usize },
    #[error("positions must form the dense sequence 1..={0}")]
    NotDense(usize),
}

/// An item with an explicit display order.
pub trait Sequenced {
    fn id(&self) -> Uuid;
    fn display_order(&self) -> i64;
    fn set_display_order(&mut self, order: i64);
}

/// Splices the item at `src` into position `dst` and renumbers the whole
/// list 1..=N. Returns the id-to-position pairs to persist in one batch.
pub fn reorder<T: Sequenced>(
    items: &mut Vec<T>,
    src: usize,
    dst: usize,
) -> Result<Vec<(Uuid, i64)>, OrderError> {
    let len = items.len();
    if src >= len {
        return Err(OrderError::IndexOutOfRange { index: src, len });
    }
    if dst >= len {
        return Err(OrderError::IndexOutOfRange { index: dst, len });
    }

    let moved = items.remove(src);
    items.insert(dst, moved);

    let mut pairs = Vec::with_capacity(len);
    for (index, item) in items.iter_mut().enumerate() {
        let order = (index + 1) as i64;
        item.set_display_order(order);
        pairs.push((item.id(), order));
    }
    Ok(pairs)
}

/// Single-step "move up" control, the adjacent special case of [`reorder`].
pub fn move_up<T: Sequenced>(
    items: &mut Vec<T>,
    index: usize,
) -> Result<Vec<(Uuid, i64)>, OrderError> {
    if index == 0 {
        let len = items.len();
        return Err(OrderError::IndexOutOfRange { index: 0, len });
    }
    reorder(items, index, index - 1)
}

/// Single-step "move down" control.
pub fn move_down<T: Sequenced>(
    items: &mut Vec<T>,
    index: usize,
) -> Result<Vec<(Uuid, i64)>, OrderError> {
    reorder(items, index, index + 1)
}

/// Checks that a persisted ordering covers exactly `expected_ids` with a
/// dense 1..=N sequence. Reorder endpoints run every incoming batch through
/// this before writing anything.
pub fn validate_order(expected_ids: &[Uuid], pairs: &[(Uuid, i64)]) -> Result<(), OrderError> {
    if pairs.len() != expected_ids.len() {
        return Err(OrderError::WrongCount {
            expected: expected_ids.len(),
            actual: pairs.len(),
        });
    }

    let mut seen = std::collections::HashSet::with_capacity(pairs.len());
    let mut positions: Vec<i64> = Vec::with_capacity(pairs.len());
    for (id, position) in pairs {
        if !expected_ids.contains(id) {
            return Err(OrderError::UnknownId(*id));
        }
        if !seen.insert(*id) {
            return Err(OrderError::DuplicateId(*id));
        }
        positions.push(*position);
    }

    positions.sort_unstable();
    let dense = positions
        .iter()
        .enumerate()
        .all(|(index, position)| *position == (index + 1) as i64);
    if !dense {
        return Err(OrderError::NotDense(pairs.len()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Img {
        id: Uuid,
        order: i64,
    }

    impl Sequenced for Img {
        fn id(&self) -> Uuid {
            self.id
        }
        fn display_order(&self) -> i64 {
            self.order
        }
        fn set_display_order(&mut self, order: i64) {
            self.order = order;
        }
    }

    fn gallery(n: usize) -> Vec<Img> {
        (0..n)
            .map(|index| Img {
                id: Uuid::new_v4(),
                order: (index + 1) as i64,
            })
            .collect()
    }

    #[test]
    fn reorder_moves_item_and_renumbers_densely() {
        let mut items = gallery(5);
        let ids: Vec<Uuid> = items.iter().map(|img| img.id).collect();

        let pairs = reorder(&mut items, 0, 3).unwrap();

        // Moved item sits at destination (1-indexed position 4).
        assert_eq!(items[3].id, ids[0]);
        // Others preserve relative order.
        assert_eq!(items[0].id, ids[1]);
        assert_eq!(items[1].id, ids[2]);
        assert_eq!(items[2].id, ids[3]);
        assert_eq!(items[4].id, ids[4]);
        // Dense 1..=N.
        let orders: Vec<i64> = items.iter().map(|img| img.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
        assert_eq!(pairs.len(), 5);
        assert_eq!(pairs[3], (ids[0], 4));
    }

    #[test]
    fn reorder_towards_head_keeps_relative_order() {
        let mut items = gallery(4);
        let ids: Vec<Uuid> = items.iter().map(|img| img.id).collect();

        reorder(&mut items, 3, 1).unwrap();

        let got: Vec<Uuid> = items.iter().map(|img| img.id).collect();
        assert_eq!(got, vec![ids[0], ids[3], ids[1], ids[2]]);
    }

    #[test]
    fn reorder_rejects_out_of_range_indices() {
        let mut items = gallery(3);
        assert_eq!(
            reorder(&mut items, 5, 0),
            Err(OrderError::IndexOutOfRange { index: 5, len: 3 })
        );
        assert_eq!(
            reorder(&mut items, 0, 3),
            Err(OrderError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn move_up_and_down_are_adjacent_swaps() {
        let mut items = gallery(3);
        let ids: Vec<Uuid> = items.iter().map(|img| img.id).collect();

        move_down(&mut items, 0).unwrap();
        let got: Vec<Uuid> = items.iter().map(|img| img.id).collect();
        assert_eq!(got, vec![ids[1], ids[0], ids[2]]);

        move_up(&mut items, 1).unwrap();
        let got: Vec<Uuid> = items.iter().map(|img| img.id).collect();
        assert_eq!(got, vec![ids[0], ids[1], ids[2]]);

        assert!(move_up(&mut items, 0).is_err());
        assert!(move_down(&mut items, 2).is_err());
    }

    #[test]
    fn validate_order_accepts_a_dense_permutation() {
        let items = gallery(3);
        let ids: Vec<Uuid> = items.iter().map(|img| img.id).collect();
        let pairs = vec![(ids[2], 1), (ids[0], 2), (ids[1], 3)];
        assert!(validate_order(&ids, &pairs).is_ok());
    }

    #[test]
    fn validate_order_rejects_gaps_duplicates_and_strangers() {
        let items = gallery(3);
        let ids: Vec<Uuid> = items.iter().map(|img| img.id).collect();

        let gap = vec![(ids[0], 1), (ids[1], 2), (ids[2], 4)];
        assert_eq!(validate_order(&ids, &gap), Err(OrderError::NotDense(3)));

        let dup = vec![(ids[0], 1), (ids[0], 2), (ids[2], 3)];
        assert_eq!(validate_order(&ids, &dup), Err(OrderError::DuplicateId(ids[0])));

        let stranger = Uuid::new_v4();
        let unknown = vec![(ids[0], 1), (ids[1], 2), (stranger, 3)];
        assert_eq!(
            validate_order(&ids, &unknown),
            Err(OrderError::UnknownId(stranger))
        );

        let short = vec![(ids[0], 1)];
        assert_eq!(
            validate_order(&ids, &short),
            Err(OrderError::WrongCount {
                expected: 3,
                actual: 1
            })
        );
    }
}
