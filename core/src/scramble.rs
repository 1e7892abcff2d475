use glam::Vec3;

pub fn splitmix32(mut value: u32) -> u32 {
    value = value.wrapping_add(0x9E37_79B9);
    let mut z = value;
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^ (z >> 16)
}

pub fn rand_unit(seed: u32, salt: u32) -> f32 {
    let mixed = splitmix32(seed ^ splitmix32(salt));
    let top = mixed >> 8;
    top as f32 / ((1u32 << 24) as f32)
}

/// Uniform index in `[0, bound)`.
pub fn rand_index(seed: u32, salt: u32, bound: usize) -> usize {
    if bound == 0 {
        return 0;
    }
    let idx = (rand_unit(seed, salt) * bound as f32) as usize;
    idx.min(bound - 1)
}

/// Assigns every piece its own grid cell: a uniform draw per piece, probing
/// forward (with wrap-around) past occupied cells.
pub fn scramble_cells(seed: u32, total: usize) -> Vec<usize> {
    let mut occupied = vec![false; total];
    let mut cells = Vec::with_capacity(total);
    for id in 0..total {
        let mut cell = rand_index(seed, 0xCE11_0000 ^ id as u32, total);
        while occupied[cell] {
            cell += 1;
            if cell >= total {
                cell = 0;
            }
        }
        occupied[cell] = true;
        cells.push(cell);
    }
    cells
}

/// Cells are spaced two half-diagonals apart so no two scattered pieces overlap.
pub fn scatter_position(cell: usize, dim: usize, piece_size: Vec3, depth: f32) -> Vec3 {
    let spacing = (piece_size.length() / 2.0).ceil();
    let dim = dim.max(1);
    Vec3::new(
        2.0 * (cell / dim) as f32 * spacing,
        2.0 * (cell % dim) as f32 * spacing,
        depth,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_distinct_and_in_range() {
        for total in [4usize, 9, 16, 49] {
            for seed in [0u32, 1, 0x5EED_2520, 0xFFFF_FFFF] {
                let cells = scramble_cells(seed, total);
                assert_eq!(cells.len(), total);
                let mut seen = vec![false; total];
                for cell in cells {
                    assert!(cell < total);
                    assert!(!seen[cell], "cell {cell} assigned twice");
                    seen[cell] = true;
                }
            }
        }
    }

    #[test]
    fn same_seed_same_scatter() {
        assert_eq!(scramble_cells(42, 16), scramble_cells(42, 16));
    }

    #[test]
    fn rand_unit_stays_in_unit_interval() {
        for salt in 0..1000 {
            let value = rand_unit(7, salt);
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn scatter_spacing_uses_half_diagonal() {
        let size = Vec3::new(6.0, 8.0, 0.0);
        assert_eq!(scatter_position(0, 2, size, 1.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(scatter_position(1, 2, size, 1.0), Vec3::new(0.0, 10.0, 1.0));
        assert_eq!(scatter_position(3, 2, size, 1.0), Vec3::new(10.0, 10.0, 1.0));
    }
}
