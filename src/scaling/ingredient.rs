use regex::Regex;
use std::sync::OnceLock;

const UNICODE_FRACTIONS: [(char, f64); 15] = [
    ('½', 1.0 / 2.0),
    ('⅓', 1.0 / 3.0),
    ('⅔', 2.0 / 3.0),
    ('¼', 1.0 / 4.0),
    ('¾', 3.0 / 4.0),
    ('⅕', 1.0 / 5.0),
    ('⅖', 2.0 / 5.0),
    ('⅗', 3.0 / 5.0),
    ('⅘', 4.0 / 5.0),
    ('⅙', 1.0 / 6.0),
    ('⅚', 5.0 / 6.0),
    ('⅛', 1.0 / 8.0),
    ('⅜', 3.0 / 8.0),
    ('⅝', 5.0 / 8.0),
    ('⅞', 7.0 / 8.0),
];

/// Fractions rendered as glyphs when a quantity lands near them.
const COMMON_FRACTIONS: [(f64, &str); 9] = [
    (1.0 / 8.0, "⅛"),
    (1.0 / 4.0, "¼"),
    (1.0 / 3.0, "⅓"),
    (3.0 / 8.0, "⅜"),
    (1.0 / 2.0, "½"),
    (5.0 / 8.0, "⅝"),
    (2.0 / 3.0, "⅔"),
    (3.0 / 4.0, "¾"),
    (7.0 / 8.0, "⅞"),
];

const FRACTION_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIngredient {
    /// `None` for lines like "Salt to taste".
    pub quantity: Option<f64>,
    pub unit: String,
    pub item: String,
}

impl ParsedIngredient {
    fn unquantified(line: &str) -> Self {
        Self {
            quantity: None,
            unit: String::new(),
            item: line.to_string(),
        }
    }
}

/// Split an ingredient line into quantity, unit and item.
///
/// Accepted leading quantities: `2`, `1.5`, `1/2`, `3-4` (mean of the bounds),
/// `1 1/2` and `1½` (mixed numbers). Vulgar fraction glyphs are read as their
/// decimal value.
pub fn parse_ingredient(line: &str) -> ParsedIngredient {
    static QUANTITY_RE: OnceLock<Regex> = OnceLock::new();
    let re = QUANTITY_RE.get_or_init(|| {
        Regex::new(
            r"^(\d+\s+\d+/\d+|\d+(?:/\d+)?(?:\.\d+)?(?:\s*-\s*\d+(?:/\d+)?(?:\.\d+)?)?)\s*([\w.]+)?\s*(.*)$",
        )
        .expect("valid ingredient regex")
    });

    let processed = replace_unicode_fractions(line);
    let Some(caps) = re.captures(&processed) else {
        return ParsedIngredient::unquantified(line);
    };

    let Some(quantity) = resolve_quantity(&caps[1]) else {
        return ParsedIngredient::unquantified(line);
    };

    ParsedIngredient {
        quantity: Some(quantity),
        unit: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
        item: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
    }
}

/// Render a quantity for display: near-fractions as glyphs, integers
/// without decimals, anything else rounded to one decimal place.
pub fn format_quantity(value: f64) -> String {
    let whole = value.floor();
    let remainder = value - whole;

    let nearest = COMMON_FRACTIONS
        .iter()
        .map(|(fraction, glyph)| ((remainder - fraction).abs(), *glyph))
        .min_by(|a, b| a.0.total_cmp(&b.0));
    if let Some((distance, glyph)) = nearest {
        if distance < FRACTION_TOLERANCE {
            return if whole > 0.0 {
                format!("{} {}", whole, glyph)
            } else {
                glyph.to_string()
            };
        }
    }

    if value.fract() == 0.0 {
        return format!("{}", value);
    }

    let rounded = (value * 10.0).round() / 10.0;
    format!("{}", rounded)
}

/// Scale the leading quantity of `line` by `factor`. Lines without a
/// quantity come back untouched.
pub fn scale_ingredient_line(line: &str, factor: f64) -> String {
    let parsed = parse_ingredient(line);
    let Some(quantity) = parsed.quantity else {
        return line.to_string();
    };

    let formatted = format_quantity(quantity * factor);
    format!("{} {} {}", formatted, parsed.unit, parsed.item)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn unicode_fraction_value(ch: char) -> Option<f64> {
    UNICODE_FRACTIONS
        .iter()
        .find(|(glyph, _)| *glyph == ch)
        .map(|(_, value)| *value)
}

fn replace_unicode_fractions(line: &str) -> String {
    static MIXED_RE: OnceLock<Regex> = OnceLock::new();
    let mixed_re = MIXED_RE.get_or_init(|| {
        Regex::new(r"^(\d+)\s*([½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞])").expect("valid mixed fraction regex")
    });

    let mut result = match mixed_re.captures(line) {
        Some(caps) => {
            let whole = caps[1].parse::<f64>().unwrap_or(0.0);
            let fraction = caps[2]
                .chars()
                .next()
                .and_then(unicode_fraction_value)
                .unwrap_or(0.0);
            let prefix_len = caps[0].len();
            format!("{}{}", whole + fraction, &line[prefix_len..])
        }
        None => line.to_string(),
    };

    for (glyph, value) in UNICODE_FRACTIONS {
        if result.contains(glyph) {
            result = result.replace(glyph, &value.to_string());
        }
    }

    result
}

fn resolve_quantity(token: &str) -> Option<f64> {
    if let Some((low, high)) = token.split_once('-') {
        let low = resolve_simple(low.trim())?;
        let high = resolve_simple(high.trim())?;
        return Some((low + high) / 2.0);
    }

    let mut parts = token.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(whole), Some(fraction)) => {
            Some(whole.parse::<f64>().ok()? + resolve_simple(fraction)?)
        }
        (Some(single), None) => resolve_simple(single),
        _ => None,
    }
}

fn resolve_simple(token: &str) -> Option<f64> {
    match token.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator = numerator.parse::<f64>().ok()?;
            let denominator = denominator.parse::<f64>().ok()?;
            if denominator == 0.0 {
                return None;
            }
            Some(numerator / denominator)
        }
        None => token.parse::<f64>().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_quantity_unit_and_item() {
        let parsed = parse_ingredient("2 cups flour");
        assert_eq!(parsed.quantity, Some(2.0));
        assert_eq!(parsed.unit, "cups");
        assert_eq!(parsed.item, "flour");
    }

    #[test]
    fn parses_slash_fraction() {
        assert_eq!(parse_ingredient("1/2 tsp salt").quantity, Some(0.5));
    }

    #[test]
    fn range_resolves_to_mean() {
        assert_eq!(parse_ingredient("3-4 cloves garlic").quantity, Some(3.5));
        assert_eq!(parse_ingredient("1/2 - 1 cup stock").quantity, Some(0.75));
    }

    #[test]
    fn unicode_glyphs_become_decimals() {
        let parsed = parse_ingredient("¾ cup sugar");
        assert_eq!(parsed.quantity, Some(0.75));
        assert_eq!(parsed.unit, "cup");
        assert_eq!(parsed.item, "sugar");
    }

    #[test]
    fn mixed_numbers_are_summed() {
        assert_eq!(parse_ingredient("1½ cups milk").quantity, Some(1.5));
        assert_eq!(parse_ingredient("1 ½ cups milk").quantity, Some(1.5));
        assert_eq!(parse_ingredient("2 1/4 cups flour").quantity, Some(2.25));
    }

    #[test]
    fn descriptive_line_has_no_quantity() {
        let parsed = parse_ingredient("Salt to taste");
        assert_eq!(parsed.quantity, None);
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.item, "Salt to taste");
    }

    #[test]
    fn zero_denominator_is_not_a_quantity() {
        assert_eq!(parse_ingredient("1/0 cup water").quantity, None);
    }

    #[test]
    fn formats_common_fractions() {
        assert_eq!(format_quantity(0.5), "½");
        assert_eq!(format_quantity(3.5), "3 ½");
        assert_eq!(format_quantity(1.0 / 3.0), "⅓");
        assert_eq!(format_quantity(2.26), "2 ¼");
    }

    #[test]
    fn formats_integers_and_decimals() {
        assert_eq!(format_quantity(4.0), "4");
        assert_eq!(format_quantity(0.0), "0");
        assert_eq!(format_quantity(1.44), "1.4");
        assert_eq!(format_quantity(1.06), "1.1");
        assert_eq!(format_quantity(2.96), "3");
    }

    #[test]
    fn scaling_by_one_keeps_the_line() {
        assert_eq!(scale_ingredient_line("2 cups flour", 1.0), "2 cups flour");
    }

    #[test]
    fn nearest_glyph_wins_over_earlier_table_entry() {
        assert_eq!(format_quantity(2.0 / 3.0), "⅔");
        assert_eq!(format_quantity(3.0 / 8.0), "⅜");
        assert_eq!(scale_ingredient_line("⅔ cup sugar", 1.0), "⅔ cup sugar");
        assert_eq!(scale_ingredient_line("⅜ tsp salt", 1.0), "⅜ tsp salt");
        assert_eq!(scale_ingredient_line("2/3 cup milk", 1.0), "⅔ cup milk");
        assert_eq!(
            scale_ingredient_line("1 2/3 cups flour", 1.0),
            "1 ⅔ cups flour"
        );
    }

    #[test]
    fn scaling_fraction_doubles_to_whole() {
        assert_eq!(scale_ingredient_line("1/2 tsp salt", 2.0), "1 tsp salt");
    }

    #[test]
    fn scaling_range_renders_fraction_glyph() {
        assert_eq!(
            scale_ingredient_line("3-4 cloves garlic", 1.0),
            "3 ½ cloves garlic"
        );
    }

    #[test]
    fn descriptive_line_is_returned_verbatim() {
        assert_eq!(scale_ingredient_line("Salt to taste", 2.5), "Salt to taste");
        assert_eq!(scale_ingredient_line("  Fresh  herbs ", 3.0), "  Fresh  herbs ");
    }

    #[test]
    fn scaled_output_collapses_whitespace() {
        assert_eq!(scale_ingredient_line("2   eggs", 1.5), "3 eggs");
        assert_eq!(scale_ingredient_line("1 cup   rice  ", 1.25), "1 ¼ cup rice");
    }

    #[test]
    fn scaling_to_zero_still_renders() {
        assert_eq!(scale_ingredient_line("2 cups flour", 0.0), "0 cups flour");
    }
}
