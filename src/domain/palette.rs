/// Button colors. Seven fixed tokens; a round draws its colors from a
/// shuffled copy so no two buttons in a round share a color.

use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ButtonColor {
    Red,
    LightGreen,
    Blue,
    Yellow,
    Orange,
    Purple,
    DarkGreen,
}

pub const PALETTE: [ButtonColor; 7] = [
    ButtonColor::Red,
    ButtonColor::LightGreen,
    ButtonColor::Blue,
    ButtonColor::Yellow,
    ButtonColor::Orange,
    ButtonColor::Purple,
    ButtonColor::DarkGreen,
];

impl ButtonColor {
    /// Fill color as (r, g, b).
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ButtonColor::Red => (0xf4, 0xa7, 0xa7),
            ButtonColor::LightGreen => (0xbf, 0xf7, 0xbf),
            ButtonColor::Blue => (0xc9, 0xdd, 0xff),
            ButtonColor::Yellow => (0xff, 0xf6, 0xa5),
            ButtonColor::Orange => (0xff, 0xd5, 0xb5),
            ButtonColor::Purple => (0xe3, 0xc8, 0xff),
            ButtonColor::DarkGreen => (0x2e, 0x7d, 0x32),
        }
    }

    /// Is the fill dark enough to need a light label?
    pub fn is_dark(self) -> bool {
        let (r, g, b) = self.rgb();
        // Rec. 601 luma
        (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000 < 128
    }
}

/// First `n` colors of a freshly shuffled palette.
/// Asking for more than the palette holds yields the whole palette.
pub fn shuffled_colors<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<ButtonColor> {
    let mut colors = PALETTE.to_vec();
    colors.shuffle(rng);
    colors.truncate(n);
    colors
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn draw_is_without_repetition() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 0..=PALETTE.len() {
            let colors = shuffled_colors(n, &mut rng);
            assert_eq!(colors.len(), n);
            let unique: HashSet<_> = colors.iter().collect();
            assert_eq!(unique.len(), n);
        }
    }

    #[test]
    fn oversized_draw_caps_at_palette() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(shuffled_colors(12, &mut rng).len(), PALETTE.len());
    }

    #[test]
    fn shuffle_varies_between_draws() {
        let mut rng = StdRng::seed_from_u64(42);
        let first = shuffled_colors(7, &mut rng);
        let differs = (0..20).any(|_| shuffled_colors(7, &mut rng) != first);
        assert!(differs);
    }

    #[test]
    fn only_dark_green_needs_light_text() {
        let dark: Vec<_> = PALETTE.iter().filter(|c| c.is_dark()).collect();
        assert_eq!(dark, vec![&ButtonColor::DarkGreen]);
    }
}
