//! Four-wall exhibit layout.
//!
//! Items round-robin across the walls in list order and fill a
//! fixed-column grid on each wall. The computation is a pure function of
//! its inputs: no randomness, no hidden state, O(n).
//!
//! Grid cells are uniform even though rendered frame sizes vary. Size
//! hints only affect the rendered frame, not cell allocation, which
//! keeps placement deterministic and independent of item content at the
//! cost of uneven visual spacing for unusual sizes.

use crate::math::Vec3;
use crate::room::Room;

/// Tunable layout parameters.
#[derive(Debug, Clone, Copy)]
pub struct LayoutOptions {
    /// Offset from the wall plane along its normal, so frames never
    /// z-fight the wall surface.
    pub float_from_wall: f32,
    /// Height of the first row's anchor.
    pub base_y: f32,
    /// Rows never anchor above `room.height - top_margin`.
    pub top_margin: f32,
    pub col_gap: f32,
    pub row_gap: f32,
    /// Uniform cell frame size used for grid allocation.
    pub frame_w: f32,
    pub frame_h: f32,
    /// Margin kept clear at both ends of each wall.
    pub side_margin: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            float_from_wall: 0.75,
            base_y: 4.0,
            top_margin: 1.2,
            col_gap: 2.0,
            row_gap: 2.2,
            frame_w: 4.4,
            frame_h: 3.2,
            side_margin: 2.0,
        }
    }
}

/// Computed position and facing for one item, valid for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    /// Wall normal; callers orient the item to face along it, into the room.
    pub normal: Vec3,
}

/// Assigns `n` items to walls and computes one placement per index.
///
/// Item `i` goes to wall `i % 4` (front, back, left, right), preserving
/// relative order within each wall. Returns one entry per index; an
/// entry is `None` only when its wall could not place it, which callers
/// must treat as a degraded layout.
pub fn compute_layout(n: usize, room: &Room, opts: &LayoutOptions) -> Vec<Option<Placement>> {
    let walls = room.walls();
    let mut by_wall: [Vec<usize>; 4] = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];
    for i in 0..n {
        by_wall[i % 4].push(i);
    }

    let mut out = vec![None; n];

    for (wall, indices) in walls.iter().zip(by_wall.iter()) {
        if indices.is_empty() {
            continue;
        }

        let usable_span = (wall.span - opts.side_margin * 2.0).max(0.0);
        let cell_w = opts.frame_w + opts.col_gap;
        // Floors at one column: a degenerate span overlaps rather than fails.
        let cols = ((usable_span / cell_w).floor() as usize).max(1);

        for (k, &idx) in indices.iter().enumerate() {
            let col = k % cols;
            let row = k / cols;

            let x_offset = (col as f32 - (cols as f32 - 1.0) / 2.0) * cell_w;
            let y = (opts.base_y + row as f32 * (opts.frame_h + opts.row_gap))
                .min(room.height - opts.top_margin);

            let mut anchor = wall.center + wall.right * x_offset;
            anchor.y = y;

            out[idx] = Some(Placement {
                position: anchor + wall.normal * opts.float_from_wall,
                normal: wall.normal,
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::WallKind;

    fn room30() -> Room {
        Room::new(30.0, 30.0, 30.0).unwrap()
    }

    #[test]
    fn every_index_gets_a_placement() {
        let placements = compute_layout(13, &room30(), &LayoutOptions::default());
        assert_eq!(placements.len(), 13);
        assert!(placements.iter().all(|p| p.is_some()));
    }

    #[test]
    fn round_robin_balance() {
        // 13 items: walls receive 4, 3, 3, 3.
        let mut counts = [0usize; 4];
        for i in 0..13 {
            counts[i % 4] += 1;
        }
        assert_eq!(counts, [4, 3, 3, 3]);
    }

    #[test]
    fn column_count_is_deterministic() {
        let opts = LayoutOptions::default();
        // span 30, margins 2 each side -> usable 26; cell 6.4 -> 4 columns.
        let usable = 30.0 - opts.side_margin * 2.0;
        let cols = ((usable / (opts.frame_w + opts.col_gap)).floor() as usize).max(1);
        assert_eq!(cols, 4);

        let a = compute_layout(8, &room30(), &opts);
        let b = compute_layout(8, &room30(), &opts);
        assert_eq!(a, b);
    }

    #[test]
    fn five_items_concrete_scenario() {
        let opts = LayoutOptions::default();
        let room = room30();
        let placements = compute_layout(5, &room, &opts);

        // A(0) and E(4) share the front wall, B/C/D take back/left/right.
        let front = room.wall(WallKind::Front);
        let cell_w = opts.frame_w + opts.col_gap;

        let a = placements[0].unwrap();
        let e = placements[4].unwrap();
        assert_eq!(a.normal, front.normal);
        assert_eq!(e.normal, front.normal);

        // Both in row 0, centered as a pair: offsets -cell_w/2 and +cell_w/2
        // do not apply with 4 columns; the grid centers on (cols-1)/2.
        // With cols=4: k=0 -> -1.5*cell_w, k=1 -> -0.5*cell_w.
        assert!((a.position.x - (-1.5 * cell_w)).abs() < 1e-5);
        assert!((e.position.x - (-0.5 * cell_w)).abs() < 1e-5);
        assert!((a.position.y - opts.base_y).abs() < 1e-5);
        assert!((e.position.y - opts.base_y).abs() < 1e-5);
        // Floated off the wall plane.
        assert!((a.position.z - (-15.0 + opts.float_from_wall)).abs() < 1e-5);

        assert_eq!(placements[1].unwrap().normal, room.wall(WallKind::Back).normal);
        assert_eq!(placements[2].unwrap().normal, room.wall(WallKind::Left).normal);
        assert_eq!(placements[3].unwrap().normal, room.wall(WallKind::Right).normal);
    }

    #[test]
    fn two_items_on_front_symmetric_when_two_columns() {
        // Narrow room: usable 10.8 / cell 6.4 -> 1 column. Widen until 2.
        let opts = LayoutOptions::default();
        let room = Room::new(16.8, 30.0, 16.8).unwrap(); // usable 12.8 -> 2 cols
        let placements = compute_layout(5, &room, &opts);
        let cell_w = opts.frame_w + opts.col_gap;

        let a = placements[0].unwrap();
        let e = placements[4].unwrap();
        assert!((a.position.x - (-cell_w / 2.0)).abs() < 1e-5);
        assert!((e.position.x - (cell_w / 2.0)).abs() < 1e-5);
    }

    #[test]
    fn rows_clamp_at_ceiling() {
        let opts = LayoutOptions::default();
        // Tiny room: one column per wall, many rows, low ceiling.
        let room = Room::new(5.0, 6.0, 5.0).unwrap();
        let placements = compute_layout(40, &room, &opts);
        let limit = room.height - opts.top_margin;
        for p in placements.iter().flatten() {
            assert!(p.position.y <= limit + 1e-5);
        }
    }

    #[test]
    fn degenerate_span_does_not_panic() {
        let opts = LayoutOptions {
            side_margin: 100.0, // usable span collapses to 0
            ..LayoutOptions::default()
        };
        let placements = compute_layout(6, &Room::new(4.0, 4.0, 4.0).unwrap(), &opts);
        // Column count floors at 1; everything still places (overlapping).
        assert!(placements.iter().all(|p| p.is_some()));
    }

    #[test]
    fn empty_list_yields_empty_layout() {
        assert!(compute_layout(0, &room30(), &LayoutOptions::default()).is_empty());
    }
}
