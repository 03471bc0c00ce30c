use ratatui::style::Color;

const BLACK: Color = Color::Rgb(0, 0, 0);
const WHITE: Color = Color::Rgb(255, 255, 255);

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Label background; unparseable colors fall back to gray.
pub fn hex_to_color(hex: &str) -> Color {
    parse_hex(hex)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::DarkGray)
}

/// Black or white text for the given background, by W3C relative luminance.
pub fn contrast_color(background_hex: &str) -> Color {
    match parse_hex(background_hex) {
        Some((r, g, b)) if relative_luminance(r, g, b) > 0.179 => BLACK,
        _ => WHITE,
    }
}

fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    0.2126 * linearize(r) + 0.7152 * linearize(g) + 0.0722 * linearize(b)
}

fn linearize(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_with_or_without_hash() {
        assert_eq!(hex_to_color("d73a4a"), Color::Rgb(0xd7, 0x3a, 0x4a));
        assert_eq!(hex_to_color("#d73a4a"), Color::Rgb(0xd7, 0x3a, 0x4a));
        assert_eq!(hex_to_color("nope"), Color::DarkGray);
    }

    #[test]
    fn contrast_picks_readable_text() {
        assert_eq!(contrast_color("ffffff"), BLACK);
        assert_eq!(contrast_color("000000"), WHITE);
        assert_eq!(contrast_color("ff0000"), BLACK);
        assert_eq!(contrast_color("ffff00"), BLACK);
        assert_eq!(contrast_color("0000aa"), WHITE);
    }

    #[test]
    fn invalid_hex_gets_white_text() {
        assert_eq!(contrast_color("xyz"), WHITE);
        assert_eq!(contrast_color("zzzzzz"), WHITE);
    }
}
