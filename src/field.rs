//! Rectangular grid of cells, each holding at most one occupant.

use crate::location::Location;
use smallvec::SmallVec;

const OFFSETS_8: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Neighbour list of a single cell (at most eight entries).
pub type Neighbours = SmallVec<[Location; 8]>;

/// Fixed-size grid of `depth x width` slots.
///
/// The field stores lightweight handles (`T`), not the agents themselves:
/// agents are owned by the simulator and the field only records which
/// handle sits where. Accessing a location outside the grid is a
/// programming error and panics.
#[derive(Debug, Clone)]
pub struct Field<T> {
    depth: usize,
    width: usize,
    slots: Vec<Option<T>>,
}

impl<T: Copy> Field<T> {
    /// Create an empty field with the given dimensions.
    pub fn new(depth: usize, width: usize) -> Self {
        Self {
            depth,
            width,
            slots: vec![None; depth * width],
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Empty every slot of the field.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Empty the slot at `location`.
    pub fn clear_location(&mut self, location: Location) {
        let idx = self.index(location);
        self.slots[idx] = None;
    }

    /// Put `occupant` at `location`, overwriting whatever was there.
    pub fn place(&mut self, occupant: T, location: Location) {
        let idx = self.index(location);
        self.slots[idx] = Some(occupant);
    }

    /// Occupant at `location`, if any.
    pub fn occupant_at(&self, location: Location) -> Option<T> {
        self.slots[self.index(location)]
    }

    pub fn is_free(&self, location: Location) -> bool {
        self.occupant_at(location).is_none()
    }

    /// Cells adjacent to `location`, clipped at the field border.
    ///
    /// The order is fixed (row-major over the surrounding 3x3 block) but
    /// carries no meaning; callers wanting unbiased choices randomize it.
    pub fn adjacent_locations(&self, location: Location) -> Neighbours {
        // Validates the centre itself.
        self.index(location);

        let mut result = Neighbours::new();
        for (d_row, d_col) in OFFSETS_8 {
            let row = location.row().checked_add_signed(d_row);
            let col = location.col().checked_add_signed(d_col);
            if let (Some(row), Some(col)) = (row, col) {
                if row < self.depth && col < self.width {
                    result.push(Location::new(row, col));
                }
            }
        }
        result
    }

    /// Unoccupied cells adjacent to `location`.
    pub fn free_adjacent_locations(&self, location: Location) -> Neighbours {
        self.adjacent_locations(location)
            .into_iter()
            .filter(|&loc| self.is_free(loc))
            .collect()
    }

    /// First unoccupied cell adjacent to `location`, following the
    /// neighbour order, or `None` if every neighbour is taken.
    pub fn free_adjacent_location(&self, location: Location) -> Option<Location> {
        self.adjacent_locations(location)
            .into_iter()
            .find(|&loc| self.is_free(loc))
    }

    /// All cells of the field in row-major order.
    pub fn locations(&self) -> impl Iterator<Item = Location> + use<T> {
        let width = self.width;
        (0..self.depth).flat_map(move |row| (0..width).map(move |col| Location::new(row, col)))
    }

    fn index(&self, location: Location) -> usize {
        assert!(
            location.row() < self.depth && location.col() < self.width,
            "location {location} is outside a {}x{} field",
            self.depth,
            self.width
        );
        location.row() * self.width + location.col()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn place_then_clear() {
        let mut field = Field::new(3, 4);
        let loc = Location::new(2, 3);
        field.place(7u32, loc);
        assert_eq!(field.occupant_at(loc), Some(7));
        field.clear_location(loc);
        assert_eq!(field.occupant_at(loc), None);
    }

    #[test]
    fn placement_round_trips_for_every_cell() {
        let mut field = Field::new(5, 6);
        let locations: Vec<_> = field.locations().collect();
        assert_eq!(locations.len(), 30);
        for (id, &loc) in locations.iter().enumerate() {
            field.place(id, loc);
        }
        for (id, &loc) in locations.iter().enumerate() {
            assert_eq!(field.occupant_at(loc), Some(id));
        }
        field.clear();
        assert!(locations.iter().all(|&loc| field.is_free(loc)));
    }

    #[test]
    fn corner_has_three_neighbours() {
        let field: Field<u8> = Field::new(5, 5);
        let adjacent = field.adjacent_locations(Location::new(0, 0));
        assert_eq!(
            adjacent.as_slice(),
            &[Location::new(0, 1), Location::new(1, 0), Location::new(1, 1)]
        );
    }

    #[test]
    fn interior_has_eight_neighbours() {
        let field: Field<u8> = Field::new(5, 5);
        let adjacent = field.adjacent_locations(Location::new(2, 2));
        assert_eq!(adjacent.len(), 8);
        assert!(!adjacent.contains(&Location::new(2, 2)));
    }

    #[test]
    fn single_cell_has_no_neighbours() {
        let field: Field<u8> = Field::new(1, 1);
        assert!(field.adjacent_locations(Location::new(0, 0)).is_empty());
        assert_eq!(field.free_adjacent_location(Location::new(0, 0)), None);
    }

    #[test]
    fn free_adjacent_location_follows_neighbour_order() {
        let mut field = Field::new(3, 3);
        field.place(1u8, Location::new(0, 0));
        field.place(2u8, Location::new(0, 1));
        assert_eq!(
            field.free_adjacent_location(Location::new(1, 1)),
            Some(Location::new(0, 2))
        );
    }

    #[test]
    fn free_adjacent_location_is_none_when_surrounded() {
        let mut field = Field::new(3, 3);
        for loc in field.locations().collect::<Vec<_>>() {
            field.place(0u8, loc);
        }
        field.clear_location(Location::new(1, 1));
        assert_eq!(field.free_adjacent_location(Location::new(1, 1)), None);
        assert!(field.free_adjacent_locations(Location::new(1, 1)).is_empty());
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_bounds_access_panics() {
        let field: Field<u8> = Field::new(2, 2);
        field.occupant_at(Location::new(2, 0));
    }

    proptest! {
        #[test]
        fn free_adjacent_never_occupied(
            depth in 1usize..8,
            width in 1usize..8,
            occupied in proptest::collection::vec(any::<bool>(), 64),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut field = Field::new(depth, width);
            let locations: Vec<_> = field.locations().collect();
            for (i, &loc) in locations.iter().enumerate() {
                if occupied[i] {
                    field.place(i, loc);
                }
            }
            let centre = *pick.get(&locations);
            let adjacent = field.adjacent_locations(centre);
            match field.free_adjacent_location(centre) {
                Some(loc) => {
                    prop_assert!(field.is_free(loc));
                    prop_assert!(adjacent.contains(&loc));
                }
                None => prop_assert!(adjacent.iter().all(|&loc| !field.is_free(loc))),
            }
            for loc in field.free_adjacent_locations(centre) {
                prop_assert!(field.is_free(loc));
            }
        }
    }
}
