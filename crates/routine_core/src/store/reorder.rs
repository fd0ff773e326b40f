//! Offset-based list reordering.

/// Moves the elements at `from_offsets` so they land before `to_offset`.
///
/// Offsets refer to positions before the move. Moved elements keep their
/// relative order. Out-of-range offsets are ignored and `to_offset` is
/// clamped to the list length.
pub fn move_offsets<T>(items: &mut Vec<T>, from_offsets: &[usize], to_offset: usize) {
    let mut offsets: Vec<usize> = from_offsets
        .iter()
        .copied()
        .filter(|&offset| offset < items.len())
        .collect();
    offsets.sort_unstable();
    offsets.dedup();
    if offsets.is_empty() {
        return;
    }

    let to_offset = to_offset.min(items.len());
    let removed_before_target = offsets.iter().filter(|&&offset| offset < to_offset).count();

    let mut moved = Vec::with_capacity(offsets.len());
    for &offset in offsets.iter().rev() {
        moved.push(items.remove(offset));
    }
    moved.reverse();

    let insert_at = to_offset - removed_before_target;
    items.splice(insert_at..insert_at, moved);
}
