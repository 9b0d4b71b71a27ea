//! The shared substrate: a fixed-size dense cell matrix on which every
//! colony applies its own transition table.
//!
//! Colonies advance strictly in index order within a tick. One colony's
//! pass stages its updates from a consistent snapshot and commits them
//! atomically before the next colony scans, so earlier colonies have
//! positional priority inside a tick while no colony ever reads its own
//! half-written pass.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

use crate::constants::{DEFAULT_DIE_AGE, DEFAULT_WOOD_AGE, MAX_GRID_DIM};
use crate::rule::RuleSet;


/// Who holds a cell: a colony by index, or the immutable wall sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellOwner {
    Colony(u16),
    Wall,
}

/// Per-position state. Element 0 is the empty material; `age` counts ticks
/// since the cell last changed while owned and resets when ownership moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub element: u8,
    pub owner: Option<CellOwner>,
    pub age: u32,
}

impl Cell {
    fn claimed(element: u8, owner: CellOwner) -> Self {
        Self {
            element,
            owner: Some(owner),
            age: 0,
        }
    }
}

/// Aging thresholds governing growth cessation and die-back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgingPolicy {
    /// Age at which an owned cell turns to wood: it holds territory but is
    /// no longer rule-evaluated.
    pub wood_age: u32,
    /// Age at which an owned cell dies back to the empty element.
    pub die_age: u32,
}

impl Default for AgingPolicy {
    fn default() -> Self {
        Self {
            wood_age: DEFAULT_WOOD_AGE,
            die_age: DEFAULT_DIE_AGE,
        }
    }
}

/// One participant: its transition table plus an opaque display color
/// carried for external collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colony {
    rule_set: RuleSet,
    color: String,
}

impl Colony {
    pub fn new(rule_set: RuleSet, color: impl Into<String>) -> Self {
        Self {
            rule_set,
            color: color.into(),
        }
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    pub fn color(&self) -> &str {
        &self.color
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    InvalidDimensions { width: usize, height: usize },
    DimensionTooLarge { max: usize, actual: usize },
    ColonyCountMismatch { rule_sets: usize, colors: usize },
    SeedOutOfBounds { x: usize, y: usize },
    SeedColonyOutOfRange { colony: u16, colonies: usize },
    WallOutOfBounds { x1: usize, y1: usize, x2: usize, y2: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidDimensions { width, height } => {
                write!(f, "grid dimensions must be positive ({width}x{height})")
            }
            GridError::DimensionTooLarge { max, actual } => {
                write!(f, "grid edge ({actual}) exceeds supported maximum ({max})")
            }
            GridError::ColonyCountMismatch { rule_sets, colors } => write!(
                f,
                "rule set count ({rule_sets}) must match color count ({colors})"
            ),
            GridError::SeedOutOfBounds { x, y } => {
                write!(f, "seed position ({x}, {y}) must lie in the grid interior")
            }
            GridError::SeedColonyOutOfRange { colony, colonies } => {
                write!(f, "colony {colony} out of range ({colonies} colonies)")
            }
            GridError::WallOutOfBounds { x1, y1, x2, y2 } => write!(
                f,
                "wall rectangle ({x1}, {y1})..({x2}, {y2}) must be ordered and inside the grid"
            ),
        }
    }
}

impl Error for GridError {}

/// The simulation arena. Allocated once at construction, cleared and
/// reseeded on [`Grid::reset`], never resized.
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    colonies: Vec<Colony>,
    aging: AgingPolicy,
    /// Shared neighbor-signature length: the count vector has one slot per
    /// spreadable element, derived from the widest colony table.
    signature_len: usize,
    cells: Vec<Cell>,
    /// Per-pass staging buffer, reused across colonies and ticks.
    staged: Vec<Option<Cell>>,
}

impl Grid {
    /// Construct with the default aging thresholds.
    pub fn new(
        width: usize,
        height: usize,
        rule_sets: Vec<RuleSet>,
        colors: Vec<String>,
    ) -> Result<Self, GridError> {
        Self::with_policy(width, height, rule_sets, colors, AgingPolicy::default())
    }

    pub fn with_policy(
        width: usize,
        height: usize,
        rule_sets: Vec<RuleSet>,
        colors: Vec<String>,
        aging: AgingPolicy,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }
        let largest = width.max(height);
        if largest > MAX_GRID_DIM {
            return Err(GridError::DimensionTooLarge {
                max: MAX_GRID_DIM,
                actual: largest,
            });
        }
        if rule_sets.len() != colors.len() {
            return Err(GridError::ColonyCountMismatch {
                rule_sets: rule_sets.len(),
                colors: colors.len(),
            });
        }
        let colonies: Vec<Colony> = rule_sets
            .into_iter()
            .zip(colors)
            .map(|(rule_set, color)| Colony::new(rule_set, color))
            .collect();
        let signature_len = colonies
            .iter()
            .map(|colony| colony.rule_set().max_arity())
            .max()
            .unwrap_or(0);
        Ok(Self {
            width,
            height,
            aging,
            signature_len,
            cells: vec![Cell::default(); width * height],
            staged: vec![None; width * height],
            colonies,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn colony_count(&self) -> usize {
        self.colonies.len()
    }

    pub fn colonies(&self) -> &[Colony] {
        &self.colonies
    }

    pub fn aging(&self) -> AgingPolicy {
        self.aging
    }

    fn index(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    /// The cell at `(x, y)`, or `None` outside the grid.
    pub fn cell_at(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Reinitialize every cell without reallocating the buffers.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::default());
        self.staged.fill(None);
    }

    /// Claim the 4-neighborhood (N/E/S/W) of a position for a colony with
    /// element 1. The center itself stays unclaimed: rule evaluation only
    /// reaches cells adjacent to live territory, and the cross shape puts
    /// the center in range of all four arms.
    pub fn place_seed(&mut self, x: usize, y: usize, colony: u16) -> Result<(), GridError> {
        if usize::from(colony) >= self.colonies.len() {
            return Err(GridError::SeedColonyOutOfRange {
                colony,
                colonies: self.colonies.len(),
            });
        }
        if x == 0 || y == 0 || x + 1 >= self.width || y + 1 >= self.height {
            return Err(GridError::SeedOutOfBounds { x, y });
        }
        let owner = CellOwner::Colony(colony);
        for (sx, sy) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            let i = self.index(sx, sy);
            self.cells[i] = Cell::claimed(1, owner);
        }
        Ok(())
    }

    /// Seed one colony per position, colony id taken from the position's
    /// index in the list.
    pub fn place_seeds(&mut self, positions: &[(usize, usize)]) -> Result<(), GridError> {
        for (colony, &(x, y)) in positions.iter().enumerate() {
            self.place_seed(x, y, colony as u16)?;
        }
        Ok(())
    }

    /// Claim an inclusive rectangle for the wall sentinel with element 1.
    /// Wall cells are never re-evaluated afterwards.
    pub fn place_wall(
        &mut self,
        x1: usize,
        y1: usize,
        x2: usize,
        y2: usize,
    ) -> Result<(), GridError> {
        if x1 > x2 || y1 > y2 || x2 >= self.width || y2 >= self.height {
            return Err(GridError::WallOutOfBounds { x1, y1, x2, y2 });
        }
        for x in x1..=x2 {
            for y in y1..=y2 {
                let i = self.index(x, y);
                self.cells[i] = Cell::claimed(1, CellOwner::Wall);
            }
        }
        Ok(())
    }

    /// Advance the whole arena `times` ticks. Each tick runs every colony
    /// once, in index order.
    pub fn evolve_all(&mut self, times: u32) {
        for _ in 0..times {
            for colony in 0..self.colonies.len() {
                self.advance_colony(colony as u16);
            }
        }
    }

    /// One colony's pass: evaluate every interior, non-wall cell adjacent
    /// to the colony's live territory, then commit the staged updates.
    fn advance_colony(&mut self, colony: u16) {
        let mut sums = vec![0u8; self.signature_len];
        for x in 1..self.width.saturating_sub(1) {
            for y in 1..self.height.saturating_sub(1) {
                let i = self.index(x, y);
                if self.cells[i].owner == Some(CellOwner::Wall) {
                    continue;
                }
                if !self.adjacent_to_colony(x, y, colony) {
                    continue;
                }
                self.fill_neighbor_sums(x, y, &mut sums);
                let next = self.evolve_cell(x, y, colony, &sums);
                self.staged[i] = Some(next);
            }
        }
        for i in 0..self.staged.len() {
            if let Some(cell) = self.staged[i].take() {
                self.cells[i] = cell;
            }
        }
    }

    /// A cell is in a colony's reach when its 8-neighborhood (self
    /// included) contains a live cell of that colony.
    fn adjacent_to_colony(&self, x: usize, y: usize, colony: u16) -> bool {
        for dx in -1..=1isize {
            for dy in -1..=1isize {
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx < 0 || ny < 0 || nx >= self.width as isize || ny >= self.height as isize {
                    continue;
                }
                let cell = &self.cells[self.index(nx as usize, ny as usize)];
                if cell.owner == Some(CellOwner::Colony(colony)) && cell.element != 0 {
                    return true;
                }
            }
        }
        false
    }

    /// Per-element counts over the 8 surrounding cells. Out-of-grid and
    /// empty neighbors count nothing; elements past the signature arity
    /// have no slot and are not counted.
    fn fill_neighbor_sums(&self, x: usize, y: usize, sums: &mut [u8]) {
        sums.fill(0);
        for dx in -1..=1isize {
            for dy in -1..=1isize {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx < 0 || ny < 0 || nx >= self.width as isize || ny >= self.height as isize {
                    continue;
                }
                let element = self.cells[self.index(nx as usize, ny as usize)].element;
                if element == 0 {
                    continue;
                }
                if let Some(slot) = sums.get_mut(element as usize - 1) {
                    *slot += 1;
                }
            }
        }
    }

    /// Evaluate one cell for one colony. Own cells pass the aging gates
    /// first: past `die_age` they scar (element cleared, owner and age
    /// retained), past `wood_age` they only age. Otherwise the colony's
    /// table decides; no matching rule is the normal no-transition case.
    fn evolve_cell(&self, x: usize, y: usize, colony: u16, sums: &[u8]) -> Cell {
        let current = self.cells[self.index(x, y)];
        let own = current.owner == Some(CellOwner::Colony(colony));

        if own && current.age >= self.aging.die_age {
            return Cell {
                element: 0,
                owner: Some(CellOwner::Colony(colony)),
                age: current.age,
            };
        }
        if own && current.age >= self.aging.wood_age {
            return Cell {
                age: current.age.saturating_add(1),
                ..current
            };
        }

        let next_age = if own { current.age.saturating_add(1) } else { 0 };
        match self.colonies[usize::from(colony)]
            .rule_set()
            .find(current.element, sums)
        {
            Some(rule) => Cell {
                element: rule.to_element,
                owner: Some(CellOwner::Colony(colony)),
                age: next_age,
            },
            None => Cell {
                age: next_age,
                ..current
            },
        }
    }

    /// Recount every colony's holdings by a full scan. A cell counts for
    /// its owner regardless of element, so scars keep counting until the
    /// territory is taken over.
    pub fn population_counts(&self) -> Vec<u64> {
        let mut counts = vec![0u64; self.colonies.len()];
        for cell in &self.cells {
            if let Some(CellOwner::Colony(id)) = cell.owner {
                if let Some(slot) = counts.get_mut(usize::from(id)) {
                    *slot += 1;
                }
            }
        }
        counts
    }
}
