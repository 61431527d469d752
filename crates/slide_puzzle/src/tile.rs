use core::fmt::{self, Display, Formatter};

use bevy::prelude::*;
use strum::{EnumIter, IntoEnumIterator};

/// Identifies a tile for the lifetime of one board. Equal to the tile's solved slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(usize);

impl TileId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl Display for TileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Orthogonal step on the board. Grid rows grow downwards.
///
/// Declaration order is the neighbour scan order: up, right, down, left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, EnumIter)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Offset in grid coordinates.
    pub const fn offset(self) -> IVec2 {
        match self {
            Self::Up => IVec2::new(0, -1),
            Self::Right => IVec2::new(1, 0),
            Self::Down => IVec2::new(0, 1),
            Self::Left => IVec2::new(-1, 0),
        }
    }

    /// Unit vector in world space, where y points up.
    pub const fn world(self) -> Vec2 {
        match self {
            Self::Up => Vec2::Y,
            Self::Right => Vec2::X,
            Self::Down => Vec2::NEG_Y,
            Self::Left => Vec2::NEG_X,
        }
    }

    pub const fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    pub fn from_offset(offset: IVec2) -> Option<Self> {
        Self::iter().find(|direction| direction.offset() == offset)
    }
}

/// Hit-testability and drag permission of a tile's visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interactivity {
    can_drag: bool,
    raycast: bool,
    turned_off_forever: bool,
}

impl Default for Interactivity {
    fn default() -> Self {
        Self {
            can_drag: false,
            raycast: true,
            turned_off_forever: false,
        }
    }
}

impl Interactivity {
    pub const fn can_drag(&self) -> bool {
        self.can_drag
    }

    pub const fn raycast(&self) -> bool {
        self.raycast
    }

    pub const fn is_turned_off_forever(&self) -> bool {
        self.turned_off_forever
    }

    /// Whether a new gesture may start on this tile.
    pub const fn accepts_input(&self) -> bool {
        self.can_drag && self.raycast && !self.turned_off_forever
    }

    pub const fn set_can_drag(&mut self, can_drag: bool) {
        self.can_drag = can_drag;
    }

    /// Toggles hit-testing. Once `final_turn_off` has been latched, later calls are ignored.
    pub const fn set_raycast(&mut self, active: bool, final_turn_off: bool) {
        if self.turned_off_forever {
            return;
        }
        self.raycast = active;
        self.turned_off_forever = final_turn_off;
    }
}

/// Visual half of a tile: where it is drawn and where its current gesture started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileVisual {
    handle: Option<Entity>,
    anchored_position: Vec2,
    initial_position: Vec2,
    interactivity: Interactivity,
}

impl TileVisual {
    pub fn new(anchored_position: Vec2) -> Self {
        Self {
            handle: None,
            anchored_position,
            initial_position: anchored_position,
            interactivity: Interactivity::default(),
        }
    }

    pub const fn handle(&self) -> Option<Entity> {
        self.handle
    }

    pub const fn anchored_position(&self) -> Vec2 {
        self.anchored_position
    }

    /// Baseline recorded at the start of the last gesture or move.
    pub const fn initial_position(&self) -> Vec2 {
        self.initial_position
    }

    pub const fn interactivity(&self) -> &Interactivity {
        &self.interactivity
    }

    pub const fn interactivity_mut(&mut self) -> &mut Interactivity {
        &mut self.interactivity
    }

    pub const fn attach(&mut self, handle: Entity) {
        self.handle = Some(handle);
    }

    pub const fn set_anchored_position(&mut self, position: Vec2) {
        self.anchored_position = position;
    }

    pub const fn set_initial_position(&mut self) {
        self.initial_position = self.anchored_position;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    id: TileId,
    coords: IVec2,
    empty: bool,
    label: usize,
    visual: TileVisual,
}

impl Tile {
    pub const fn new(
        id: TileId,
        coords: IVec2,
        empty: bool,
        label: usize,
        visual: TileVisual,
    ) -> Self {
        Self {
            id,
            coords,
            empty,
            label,
            visual,
        }
    }

    pub const fn id(&self) -> TileId {
        self.id
    }

    pub const fn coords(&self) -> IVec2 {
        self.coords
    }

    pub const fn is_empty(&self) -> bool {
        self.empty
    }

    /// Row-major index of the cell this tile occupies when the puzzle is solved.
    pub const fn target_index(&self) -> usize {
        self.id.index()
    }

    pub const fn label(&self) -> usize {
        self.label
    }

    pub const fn visual(&self) -> &TileVisual {
        &self.visual
    }

    pub const fn visual_mut(&mut self) -> &mut TileVisual {
        &mut self.visual
    }

    pub(crate) const fn shift(&mut self, offset: IVec2) {
        self.coords = IVec2::new(self.coords.x + offset.x, self.coords.y + offset.y);
    }
}
