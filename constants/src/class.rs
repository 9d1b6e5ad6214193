/// Background value written to masks where no class colour matches.
pub const BACKGROUND_CLASS: u8 = 0;

/// Annotation class painted in a fixed colour range. Bounds are inclusive RGB.
pub struct ClassInfo {
    pub id: u8,
    pub name: &'static str,
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

/// Class ids are contiguous from 1. Later entries win when ranges overlap.
pub const CLASS_MAP: &[ClassInfo] = &[
    ClassInfo {
        id: 1,
        name: "red",
        lower: [200, 0, 0],
        upper: [255, 80, 80],
    },
    ClassInfo {
        id: 2,
        name: "green",
        lower: [0, 200, 0],
        upper: [80, 255, 80],
    },
    ClassInfo {
        id: 3,
        name: "blue",
        lower: [0, 0, 200],
        upper: [80, 80, 255],
    },
    ClassInfo {
        id: 4,
        name: "yellow",
        lower: [200, 200, 0],
        upper: [255, 255, 80],
    },
];

impl ClassInfo {
    pub fn contains(&self, rgb: [u8; 3]) -> bool {
        (0..3).all(|c| rgb[c] >= self.lower[c] && rgb[c] <= self.upper[c])
    }
}

pub fn get_class_name(id: u8) -> String {
    CLASS_MAP
        .iter()
        .find(|c| c.id == id)
        .map_or("background", |c| c.name)
        .to_string()
}

/// Class id for an RGB pixel, last matching class first.
pub fn classify_rgb(rgb: [u8; 3]) -> u8 {
    CLASS_MAP
        .iter()
        .rev()
        .find(|c| c.contains(rgb))
        .map_or(BACKGROUND_CLASS, |c| c.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_colours_map_to_their_class() {
        assert_eq!(classify_rgb([255, 0, 0]), 1);
        assert_eq!(classify_rgb([0, 255, 0]), 2);
        assert_eq!(classify_rgb([0, 0, 255]), 3);
        assert_eq!(classify_rgb([230, 230, 40]), 4);
        assert_eq!(classify_rgb([128, 128, 128]), BACKGROUND_CLASS);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert_eq!(classify_rgb([200, 80, 80]), 1);
        assert_eq!(classify_rgb([199, 80, 80]), BACKGROUND_CLASS);
    }

    #[test]
    fn unknown_ids_read_as_background() {
        assert_eq!(get_class_name(3), "blue");
        assert_eq!(get_class_name(9), "background");
    }
}
