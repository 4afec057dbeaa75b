use super::*;
use rand::prelude::*;
use rand::rngs::SmallRng;

/// Uniform random placement that keeps the first revealed cell and its neighbors free of mines.
///
/// Cells are drawn uniformly from the whole grid and rejected when they fall in the exclusion zone or already hold a
/// mine, until the requested count is reached. Capacity is checked before sampling so the loop always terminates.
#[derive(Clone, Debug)]
pub struct RandomMinefieldGenerator {
    rng: SmallRng,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(&mut self, config: GameConfig, start: Coord2) -> Result<MineLayout> {
        let (rows, cols) = config.size;
        if start.0 >= rows || start.1 >= cols {
            return Err(GameError::InvalidCoords);
        }

        let free_cells = config.total_cells() - exclusion_zone_size(config.size, start);
        if config.mines > free_cells {
            log::warn!(
                "Cannot keep start {:?} clear, requested {} mines but only {} cells are free",
                start,
                config.mines,
                free_cells
            );
            return Err(GameError::TooManyMines);
        }

        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut mines_placed = 0;
        let mut draws = 0u32;

        while mines_placed < config.mines {
            let coords = (self.rng.random_range(0..rows), self.rng.random_range(0..cols));
            draws += 1;
            if is_within_one(coords, start) || mine_mask[coords.to_nd_index()] {
                continue;
            }
            mine_mask[coords.to_nd_index()] = true;
            mines_placed += 1;
        }

        log::debug!(
            "Placed {} mines avoiding {:?} after {} draws",
            mines_placed,
            start,
            draws
        );
        Ok(MineLayout::from_mine_mask(mine_mask))
    }
}
