//! ASCII rendering of a generated layer
//!
//! North is up. Rooms are `#`, ghost rooms `:`, door cells `+` when a
//! corridor or cap room uses them and `x` when sealed. Corridor cells are
//! drawn with box-drawing glyphs from their connection mask.

use std::collections::BTreeSet;

use dg_core::{Connections, GridPos, LayerLayout};

/// Box-drawing glyph for a corridor connection mask
pub fn corridor_glyph(mask: Connections) -> char {
    match mask.bits() {
        1 => '╵',
        2 => '╶',
        3 => '└',
        4 => '╷',
        5 => '│',
        6 => '┌',
        7 => '├',
        8 => '╴',
        9 => '┘',
        10 => '─',
        11 => '┴',
        12 => '┐',
        13 => '┤',
        14 => '┬',
        15 => '┼',
        _ => '·',
    }
}

pub fn render_layer(layout: &LayerLayout) -> String {
    let bounds = layout.bounds;
    let width = bounds.width.max(0) as usize;
    let height = bounds.height.max(0) as usize;
    let mut grid = vec![vec![' '; width]; height];
    let mut put = |pos: GridPos, glyph: char| {
        if bounds.contains(pos) {
            grid[pos.y as usize][pos.x as usize] = glyph;
        }
    };

    for (pos, room) in layout.occupancy.room_cells() {
        let ghost = layout.rooms.get(room.0).is_some_and(|r| r.ghost);
        put(pos, if ghost { ':' } else { '#' });
    }
    for tile in &layout.tiles {
        put(tile.position, corridor_glyph(tile.mask));
    }

    let sealed: BTreeSet<GridPos> = layout.seals.iter().map(|s| s.position).collect();
    for door in &layout.doors {
        if layout.used_doors.contains(&door.id) {
            put(door.position, '+');
        } else if sealed.contains(&door.position) {
            put(door.position, 'x');
        }
    }

    let mut out = String::with_capacity((width + 1) * height);
    for row in grid.iter().rev() {
        out.extend(row.iter());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use dg_core::{
        Direction, FixedRoom, GameRng, GeneratorConfig, RoomTemplate, Rotation, Theme, generate_layer,
    };

    fn door_room(name: &str, direction: Direction) -> Arc<RoomTemplate> {
        Arc::new(RoomTemplate::new(name, name, 1, 1).with_door(0, 0, direction))
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(corridor_glyph(Connections::NORTH | Connections::SOUTH), '│');
        assert_eq!(corridor_glyph(Connections::EAST | Connections::WEST), '─');
        assert_eq!(corridor_glyph(Connections::NORTH | Connections::EAST), '└');
        assert_eq!(corridor_glyph(Connections::all()), '┼');
        assert_eq!(corridor_glyph(Connections::empty()), '·');
    }

    #[test]
    fn test_straight_corridor_row() {
        let config = GeneratorConfig {
            grid_width: 10,
            grid_height: 10,
            target_room_count: 2,
            ..Default::default()
        };
        let rooms = [
            FixedRoom::new(door_room("a", Direction::East), GridPos::new(1, 5), Rotation::default(), 0),
            FixedRoom::new(door_room("b", Direction::West), GridPos::new(8, 5), Rotation::default(), 0),
        ];
        let layout = generate_layer(&config, &Theme::new("plain"), &rooms, 0, &mut GameRng::new(1)).unwrap();

        let text = render_layer(&layout);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        // Row y = 5 is the fifth line from the top of a 10-row grid.
        assert_eq!(lines[4], " +──────+ ");
        assert!(lines.iter().enumerate().all(|(i, l)| i == 4 || l.trim().is_empty()));
    }

    #[test]
    fn test_sealed_door_and_room_body() {
        let hall = Arc::new(RoomTemplate::new("hall", "hall", 3, 2).with_door(1, 0, Direction::South));
        let config = GeneratorConfig {
            grid_width: 6,
            grid_height: 5,
            target_room_count: 1,
            ..Default::default()
        };
        let rooms = [FixedRoom::new(hall, GridPos::new(1, 2), Rotation::default(), 0)];
        let layout = generate_layer(&config, &Theme::new("plain"), &rooms, 0, &mut GameRng::new(1)).unwrap();

        let text = render_layer(&layout);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["      ", " ###  ", " #x#  ", "      ", "      "]);
    }
}
