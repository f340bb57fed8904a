//! Free-text attribute extraction from retail product titles.
//!
//! Big-box listings cram species, dimensions, construction, and finish into a
//! single title string, e.g.:
//!
//! ```text
//! Bruce America's Best Choice White Oak Solid Hardwood
//! 3/4 in. Thick x 5 in. Wide x Varying Length
//! ```
//!
//! Each extractor is an ordered pattern list applied independently to the
//! same title. Ordering is load-bearing for species: "brazilian cherry" must
//! match before generic "cherry", and bare "oak" maps to White Oak.

use std::sync::LazyLock;

use regex::Regex;

use plankwatch_core::ProductType;

/// Everything recoverable from one title string.
///
/// `species == None` means the caller must drop the item: with no species the
/// record cannot be compared across regions. Dimensions are `None` when not
/// present in the title; the adapter applies catalog-typical defaults.
/// Finish and grade always carry a value (last-resort defaults below).
#[derive(Debug, Clone, PartialEq)]
pub struct TitleAttributes {
    pub species: Option<String>,
    pub thickness: Option<f64>,
    pub width: Option<f64>,
    pub length: Option<f64>,
    pub finish: String,
    pub grade: String,
    pub janka_hardness: i32,
}

/// Runs every extractor over `title` and assembles the result.
#[must_use]
pub fn parse_title(title: &str) -> TitleAttributes {
    let species = extract_species(title);
    let (thickness, width, length) = extract_dimensions(title);
    let janka_hardness = species.as_deref().map_or(1000, janka_hardness);

    TitleAttributes {
        species,
        thickness,
        width,
        length,
        finish: extract_finish(title),
        grade: extract_grade(title),
        janka_hardness,
    }
}

// ---------------------------------------------------------------------------
// Species
// ---------------------------------------------------------------------------

/// Ordered most-specific-first so compound names win over their generic
/// suffixes. "jatoba" and "brazilian teak" are trade aliases for Brazilian
/// Cherry.
static SPECIES_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)brazilian\s*cherry", "Brazilian Cherry"),
        (r"(?i)\bjatoba\b", "Brazilian Cherry"),
        (r"(?i)brazilian\s*teak", "Brazilian Cherry"),
        (r"(?i)white\s*oak", "White Oak"),
        (r"(?i)red\s*oak", "Red Oak"),
        (r"(?i)american\s*walnut", "Walnut"),
        (r"(?i)black\s*walnut", "Walnut"),
        (r"(?i)sugar\s*maple", "Maple"),
        (r"(?i)hard\s*maple", "Maple"),
        (r"(?i)american\s*cherry", "Cherry"),
        (r"(?i)\bhickory\b", "Hickory"),
        (r"(?i)\bpecan\b", "Hickory"),
        (r"(?i)\bmaple\b", "Maple"),
        (r"(?i)\bwalnut\b", "Walnut"),
        (r"(?i)\bcherry\b", "Cherry"),
        (r"(?i)\bash\b", "Ash"),
        // Generic "oak" defaults to White Oak.
        (r"(?i)\boak\b", "White Oak"),
        (r"(?i)\bacacia\b", "Acacia"),
        (r"(?i)\bbamboo\b", "Bamboo"),
        (r"(?i)\bbirch\b", "Birch"),
        (r"(?i)\bteak\b", "Teak"),
        (r"(?i)\bmahogany\b", "Mahogany"),
        (r"(?i)\bpine\b", "Pine"),
        (r"(?i)\bcypress\b", "Cypress"),
        (r"(?i)\bbeech\b", "Beech"),
    ]
    .into_iter()
    .map(|(pattern, name)| {
        let re = Regex::new(pattern).unwrap_or_else(|e| {
            // Patterns are compile-time constants; a failure here is a
            // programming error caught by the test suite.
            panic!("invalid species pattern {pattern}: {e}")
        });
        (re, name)
    })
    .collect()
});

/// First match wins; `None` means the caller drops the item.
#[must_use]
pub fn extract_species(title: &str) -> Option<String> {
    SPECIES_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(title))
        .map(|(_, name)| (*name).to_string())
}

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

/// Parses mixed-fraction inch literals: `"3/4"`, `"3-1/4"`, `"0.75"`, `"5"`.
/// All three shapes land in the same inch value family.
#[must_use]
pub fn parse_inch_value(raw: &str) -> Option<f64> {
    let s = raw.trim();

    static DECIMAL: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(\d+\.?\d*)$").expect("decimal pattern"));
    static MIXED: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^(\d+)\s*-\s*(\d+)\s*/\s*(\d+)$").expect("mixed fraction pattern")
    });
    static FRACTION: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(\d+)\s*/\s*(\d+)$").expect("fraction pattern"));

    if let Some(caps) = DECIMAL.captures(s) {
        return caps[1].parse::<f64>().ok();
    }

    if let Some(caps) = MIXED.captures(s) {
        let whole = caps[1].parse::<f64>().ok()?;
        let num = caps[2].parse::<f64>().ok()?;
        let den = caps[3].parse::<f64>().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some(whole + num / den);
    }

    if let Some(caps) = FRACTION.captures(s) {
        let num = caps[1].parse::<f64>().ok()?;
        let den = caps[2].parse::<f64>().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some(num / den);
    }

    None
}

/// Explicit Home Depot shape: `T in. Thick x W in. Wide [x L in|ft Long]`.
/// Declared roles are respected even when magnitudes look inverted.
static EXPLICIT_DIMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d[\d\s\-/\.]*)\s*in\.?\s*(?:Thick|T)\s*x\s*(\d[\d\s\-/\.]*)\s*in\.?\s*(?:Wide|W)(?:\s*x\s*(\d[\d\s\-/\.]*)\s*(in\.?|ft\.?)\s*(?:Long|L))?",
    )
    .expect("explicit dimension pattern")
});

/// Shorthand fallback: bare `A x B [x C]`. Thickness vs. width is
/// disambiguated by magnitude (the smaller of the two is thickness). This
/// heuristic can misread square-ish proportions; the source behaves the same
/// way and no correction is attempted.
static SHORTHAND_DIMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d[\d\s\-/\.]*)\s*(?:in\.?)?\s*x\s*(\d[\d\s\-/\.]*)\s*(?:in\.?)?(?:\s*x\s*(\d[\d\s\-/\.]*)\s*(?:in\.?|ft\.?)?)?",
    )
    .expect("shorthand dimension pattern")
});

/// Returns `(thickness, width, length)` in inches, each `None` when absent.
///
/// Feet convert to inches only when the explicit pattern's matched length
/// unit token says "ft".
#[must_use]
pub fn extract_dimensions(title: &str) -> (Option<f64>, Option<f64>, Option<f64>) {
    if let Some(caps) = EXPLICIT_DIMS.captures(title) {
        let thickness = parse_inch_value(&caps[1]);
        let width = parse_inch_value(&caps[2]);
        let length = caps.get(3).and_then(|m| {
            let value = parse_inch_value(m.as_str())?;
            let unit = caps.get(4).map_or("", |u| u.as_str());
            if unit.to_ascii_lowercase().starts_with("ft") {
                Some(value * 12.0)
            } else {
                Some(value)
            }
        });
        return (thickness, width, length);
    }

    if let Some(caps) = SHORTHAND_DIMS.captures(title) {
        let a = parse_inch_value(&caps[1]);
        let b = parse_inch_value(&caps[2]);
        let length = caps.get(3).and_then(|m| parse_inch_value(m.as_str()));

        if let (Some(a), Some(b)) = (a, b) {
            let (thickness, width) = if a < b { (a, b) } else { (b, a) };
            return (Some(thickness), Some(width), length);
        }
        return (None, None, length);
    }

    (None, None, None)
}

// ---------------------------------------------------------------------------
// Construction type
// ---------------------------------------------------------------------------

/// Substring priority: unfinished > engineered > solid, over the combined
/// title + category-hint text; the category hint alone is only a final
/// fallback; absolute default is solid.
#[must_use]
pub fn detect_type(title: &str, category_hint: Option<&str>) -> ProductType {
    let combined = format!("{} {}", title, category_hint.unwrap_or("")).to_lowercase();
    if combined.contains("unfinished") {
        return ProductType::Unfinished;
    }
    if combined.contains("engineered") {
        return ProductType::Engineered;
    }
    if combined.contains("solid") {
        return ProductType::Solid;
    }

    if let Some(hint) = category_hint {
        let hint = hint.to_lowercase();
        if hint.contains("engineered") {
            return ProductType::Engineered;
        }
        if hint.contains("unfinished") {
            return ProductType::Unfinished;
        }
    }

    ProductType::Solid
}

// ---------------------------------------------------------------------------
// Finish
// ---------------------------------------------------------------------------

/// The trailing "UV Urethane" default is the modal finish for prefinished
/// big-box stock, not a universal truth.
static FINISH_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)wire[\s-]*brush", "Wire-Brushed"),
        (r"(?i)hand[\s-]*scrap", "Hand-Scraped"),
        (r"(?i)distress", "Hand-Scraped"),
        (r"(?i)uv\s*(?:cured\s*)?urethane", "UV Urethane"),
        (r"(?i)aluminum\s*oxide", "Aluminum Oxide"),
        (r"(?i)oil[\s-]*(?:based\s*)?poly", "Oil-Based Poly"),
        (r"(?i)polyurethane", "Oil-Based Poly"),
        (r"(?i)site[\s-]*finish", "Site-Finished"),
        (r"(?i)prefinish", "UV Urethane"),
        (r"(?i)unfinish", "Unfinished"),
        (r"(?i)smooth", "UV Urethane"),
        (r"(?i)satin", "UV Urethane"),
        (r"(?i)matte", "UV Urethane"),
        (r"(?i)gloss", "UV Urethane"),
    ]
    .into_iter()
    .map(|(pattern, name)| {
        let re = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid finish pattern {pattern}: {e}"));
        (re, name)
    })
    .collect()
});

#[must_use]
pub fn extract_finish(title: &str) -> String {
    FINISH_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(title))
        .map_or_else(|| "UV Urethane".to_string(), |(_, name)| (*name).to_string())
}

// ---------------------------------------------------------------------------
// Grade
// ---------------------------------------------------------------------------

static GRADE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)\bselect\b", "Select"),
        (r"(?i)\bpremium\b", "Select"),
        (r"(?i)\b#?\s*1\s*common\b", "#1 Common"),
        (r"(?i)\b#?\s*2\s*common\b", "#2 Common"),
        (r"(?i)\bcharacter\b", "Character"),
        (r"(?i)\brustic\b", "Rustic"),
        (r"(?i)\bcabin\b", "Rustic"),
        (r"(?i)\bnatural\b", "Character"),
        (r"(?i)\bbuilder\b", "#1 Common"),
    ]
    .into_iter()
    .map(|(pattern, name)| {
        let re =
            Regex::new(pattern).unwrap_or_else(|e| panic!("invalid grade pattern {pattern}: {e}"));
        (re, name)
    })
    .collect()
});

/// "Character" is the modal grade in big-box retail; last-resort default.
#[must_use]
pub fn extract_grade(title: &str) -> String {
    GRADE_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(title))
        .map_or_else(|| "Character".to_string(), |(_, name)| (*name).to_string())
}

// ---------------------------------------------------------------------------
// Hardness
// ---------------------------------------------------------------------------

const JANKA_TABLE: &[(&str, i32)] = &[
    ("Red Oak", 1290),
    ("White Oak", 1360),
    ("Hickory", 1820),
    ("Maple", 1450),
    ("Walnut", 1010),
    ("Cherry", 950),
    ("Ash", 1320),
    ("Brazilian Cherry", 2350),
    ("Acacia", 2300),
    ("Bamboo", 1380),
    ("Birch", 1260),
    ("Teak", 1155),
    ("Mahogany", 800),
    ("Pine", 690),
    ("Cypress", 510),
    ("Beech", 1300),
];

/// Janka rating by canonical species name; 1000 for anything off-table.
#[must_use]
pub fn janka_hardness(species: &str) -> i32 {
    JANKA_TABLE
        .iter()
        .find(|(name, _)| *name == species)
        .map_or(1000, |(_, janka)| *janka)
}

#[cfg(test)]
#[path = "title_test.rs"]
mod tests;
