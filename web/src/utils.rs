use sweeper_core::{CellView, Face};

/// Helper function to use JavaScript's Math.random
pub(crate) fn js_random_seed() -> u64 {
    use js_sys::Math::random;
    u64::from_be_bytes([
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
    ])
}

pub(crate) const fn face_glyph(face: Face) -> &'static str {
    match face {
        Face::Smile => "😊",
        Face::Cool => "😎",
        Face::Dead => "😵",
    }
}

pub(crate) fn cell_text(view: CellView) -> String {
    use CellView::*;
    match view {
        Hidden | Number(0) => String::new(),
        Number(count) => count.to_string(),
        Flagged => "🚩".to_string(),
        Mine | Exploded => "💣".to_string(),
        IncorrectFlag => "❌".to_string(),
    }
}
