#![no_std]

/// The eight compass directions as `(row_delta, col_delta)` pairs.
pub const DIRECTIONS_8: [(i32, i32); 8] = [
    (-1, -1), (-1, 0), (-1, 1), (0, -1),
    (0, 1), (1, -1), (1, 0), (1, 1),
];

/// The four line orientations needed to find every straight line once:
/// horizontal, vertical, and both diagonals.
pub const LINE_DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Steps `(row, col)` by `(dr, dc)` and returns the new cell if it is still on a
/// `height` x `width` grid.
#[inline]
pub fn step(
    row: usize,
    col: usize,
    dr: i32,
    dc: i32,
    height: usize,
    width: usize,
) -> Option<(usize, usize)> {
    let r = row as i32 + dr;
    let c = col as i32 + dc;
    if r < 0 || c < 0 || r >= height as i32 || c >= width as i32 {
        None
    } else {
        Some((r as usize, c as usize))
    }
}

/// Checks for `line_size` consecutive `player` cells anywhere on a row-major grid.
///
/// # Arguments
/// * `board` - The board data as a flat slice
/// * `width` - Board width
/// * `height` - Board height
/// * `player` - The cell value to look for
/// * `line_size` - Number of consecutive cells needed
pub fn check_line_win<T: PartialEq>(
    board: &[T],
    width: usize,
    height: usize,
    player: &T,
    line_size: usize,
) -> bool {
    if line_size == 0 || board.len() < width * height {
        return false;
    }
    for r in 0..height {
        for c in 0..width {
            if board[r * width + c] != *player {
                continue;
            }
            for &(dr, dc) in LINE_DIRECTIONS.iter() {
                if run_length(board, width, height, r, c, dr, dc, player) >= line_size {
                    return true;
                }
            }
        }
    }
    false
}

/// Counts how many cells equal to `player` follow each other starting at
/// `(row, col)` and walking in direction `(dr, dc)`, the start cell included.
#[allow(clippy::too_many_arguments)]
pub fn run_length<T: PartialEq>(
    board: &[T],
    width: usize,
    height: usize,
    row: usize,
    col: usize,
    dr: i32,
    dc: i32,
    player: &T,
) -> usize {
    let mut len = 0;
    let mut cell = Some((row, col));
    while let Some((r, c)) = cell {
        if board[r * width + c] != *player {
            break;
        }
        len += 1;
        cell = step(r, c, dr, dc, height, width);
    }
    len
}

/// Visits every straight window of `line_size` cells on a row-major grid and
/// hands `visit` the number of cells equal to `own`, equal to `other`, and
/// the remaining (empty) cells.
pub fn for_each_window<T: PartialEq, F: FnMut(usize, usize, usize)>(
    board: &[T],
    width: usize,
    height: usize,
    line_size: usize,
    own: &T,
    other: &T,
    mut visit: F,
) {
    if line_size == 0 {
        return;
    }
    for r in 0..height {
        for c in 0..width {
            for &(dr, dc) in LINE_DIRECTIONS.iter() {
                let end_r = r as i32 + dr * (line_size as i32 - 1);
                let end_c = c as i32 + dc * (line_size as i32 - 1);
                if end_r < 0 || end_c < 0 || end_r >= height as i32 || end_c >= width as i32 {
                    continue;
                }
                let (mut mine, mut theirs) = (0, 0);
                for k in 0..line_size as i32 {
                    let idx = (r as i32 + dr * k) as usize * width + (c as i32 + dc * k) as usize;
                    if board[idx] == *own {
                        mine += 1;
                    } else if board[idx] == *other {
                        theirs += 1;
                    }
                }
                visit(mine, theirs, line_size - mine - theirs);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_bounds() {
        assert_eq!(step(0, 0, -1, 0, 8, 8), None);
        assert_eq!(step(0, 0, 1, 1, 8, 8), Some((1, 1)));
        assert_eq!(step(7, 7, 0, 1, 8, 8), None);
    }

    #[test]
    fn test_line_win_diagonal() {
        // 4x4, anti-diagonal of 1s
        let board = [
            0, 0, 0, 1,
            0, 0, 1, 0,
            0, 1, 0, 0,
            1, 0, 0, 0,
        ];
        assert!(check_line_win(&board, 4, 4, &1, 4));
        assert!(!check_line_win(&board, 4, 4, &1, 5));
        assert!(!check_line_win(&board, 4, 4, &2, 1));
    }

    #[test]
    fn test_window_count() {
        // 1x4 row holds exactly one horizontal window of size 4
        let board = [1, 1, 0, 2];
        let mut seen = 0;
        for_each_window(&board, 4, 1, 4, &1, &2, |mine, theirs, empty| {
            seen += 1;
            assert_eq!((mine, theirs, empty), (2, 1, 1));
        });
        assert_eq!(seen, 1);
    }
}
