use super::*;

// ---------------------------------------------------------------------------
// Species: ordering is load-bearing
// ---------------------------------------------------------------------------

#[test]
fn brazilian_cherry_wins_over_generic_cherry() {
    assert_eq!(
        extract_species("Brazilian Cherry Hardwood Flooring").as_deref(),
        Some("Brazilian Cherry")
    );
}

#[test]
fn jatoba_maps_to_brazilian_cherry() {
    assert_eq!(
        extract_species("Jatoba Solid Hardwood").as_deref(),
        Some("Brazilian Cherry")
    );
}

#[test]
fn brazilian_teak_maps_to_brazilian_cherry() {
    assert_eq!(
        extract_species("Brazilian Teak 5 in. Plank").as_deref(),
        Some("Brazilian Cherry")
    );
}

#[test]
fn bare_oak_defaults_to_white_oak() {
    assert_eq!(
        extract_species("Oak Smooth Traditional Plank").as_deref(),
        Some("White Oak")
    );
}

#[test]
fn red_oak_is_not_swallowed_by_bare_oak() {
    assert_eq!(
        extract_species("Red Oak Natural Prefinished").as_deref(),
        Some("Red Oak")
    );
}

#[test]
fn compound_walnut_names_normalize() {
    assert_eq!(
        extract_species("American Walnut Engineered").as_deref(),
        Some("Walnut")
    );
    assert_eq!(
        extract_species("Black Walnut Character Grade").as_deref(),
        Some("Walnut")
    );
}

#[test]
fn pecan_maps_to_hickory() {
    assert_eq!(extract_species("Pecan Hand-Scraped").as_deref(), Some("Hickory"));
}

#[test]
fn unknown_species_returns_none() {
    assert!(extract_species("Luxury Vinyl Plank Gray").is_none());
}

#[test]
fn species_matching_is_case_insensitive() {
    assert_eq!(
        extract_species("WHITE OAK wirebrushed").as_deref(),
        Some("White Oak")
    );
}

// ---------------------------------------------------------------------------
// Inch literals
// ---------------------------------------------------------------------------

#[test]
fn parses_simple_fraction() {
    assert_eq!(parse_inch_value("3/4"), Some(0.75));
}

#[test]
fn parses_mixed_fraction() {
    assert_eq!(parse_inch_value("3-1/4"), Some(3.25));
    assert_eq!(parse_inch_value("1-1/2"), Some(1.5));
}

#[test]
fn parses_decimal() {
    assert_eq!(parse_inch_value("0.75"), Some(0.75));
    assert_eq!(parse_inch_value("5"), Some(5.0));
}

#[test]
fn fraction_shapes_agree_on_value() {
    assert_eq!(parse_inch_value("3/4"), parse_inch_value("0.75"));
}

#[test]
fn rejects_garbage_and_zero_denominator() {
    assert_eq!(parse_inch_value("wide"), None);
    assert_eq!(parse_inch_value("3/0"), None);
}

// ---------------------------------------------------------------------------
// Dimension extraction
// ---------------------------------------------------------------------------

#[test]
fn explicit_thick_wide_pattern() {
    let (t, w, l) = extract_dimensions("3/4 in. Thick x 5 in. Wide");
    assert_eq!(t, Some(0.75));
    assert_eq!(w, Some(5.0));
    assert_eq!(l, None);
}

#[test]
fn explicit_pattern_respects_declared_roles_even_when_inverted() {
    // Magnitudes say otherwise, but Thick/Wide labels win.
    let (t, w, _) = extract_dimensions("3-1/4 in. Thick x 3/4 in. Wide");
    assert_eq!(t, Some(3.25));
    assert_eq!(w, Some(0.75));
}

#[test]
fn explicit_pattern_with_length_in_inches() {
    let (t, w, l) = extract_dimensions("1/2 in. Thick x 7-1/2 in. Wide x 48 in. Long");
    assert_eq!(t, Some(0.5));
    assert_eq!(w, Some(7.5));
    assert_eq!(l, Some(48.0));
}

#[test]
fn explicit_pattern_converts_feet_to_inches() {
    let (_, _, l) = extract_dimensions("3/4 in. Thick x 5 in. Wide x 4 ft. Long");
    assert_eq!(l, Some(48.0));
}

#[test]
fn shorthand_assigns_smaller_value_to_thickness() {
    let (t, w, _) = extract_dimensions("Hickory 3-1/4 x 3/4 Plank");
    assert_eq!(t, Some(0.75));
    assert_eq!(w, Some(3.25));
}

#[test]
fn shorthand_order_does_not_matter() {
    let (t1, w1, _) = extract_dimensions("3/4 x 5");
    let (t2, w2, _) = extract_dimensions("5 x 3/4");
    assert_eq!((t1, w1), (t2, w2));
    assert_eq!(t1, Some(0.75));
    assert_eq!(w1, Some(5.0));
}

#[test]
fn no_dimensions_in_title() {
    assert_eq!(
        extract_dimensions("White Oak Wire-Brushed Select"),
        (None, None, None)
    );
}

// ---------------------------------------------------------------------------
// Type detection
// ---------------------------------------------------------------------------

#[test]
fn unfinished_beats_engineered_and_solid() {
    assert_eq!(
        detect_type("Unfinished Engineered Red Oak", None),
        ProductType::Unfinished
    );
}

#[test]
fn engineered_beats_solid() {
    assert_eq!(
        detect_type("Engineered vs Solid comparison plank", None),
        ProductType::Engineered
    );
}

#[test]
fn title_evidence_beats_category_hint() {
    assert_eq!(
        detect_type("Solid Maple Plank", Some("engineered-hardwood")),
        // "engineered" appears in the combined text, and engineered is
        // checked before solid.
        ProductType::Engineered
    );
    assert_eq!(
        detect_type("Maple Solid Hardwood", Some("solid-hardwood")),
        ProductType::Solid
    );
}

#[test]
fn category_hint_alone_is_final_fallback() {
    assert_eq!(
        detect_type("Maple Plank Natural", Some("engineered-hardwood")),
        ProductType::Engineered
    );
}

#[test]
fn default_type_is_solid() {
    assert_eq!(detect_type("Maple Plank Natural", None), ProductType::Solid);
}

// ---------------------------------------------------------------------------
// Finish
// ---------------------------------------------------------------------------

#[test]
fn wire_brushed_and_hand_scraped() {
    assert_eq!(extract_finish("White Oak Wire Brushed"), "Wire-Brushed");
    assert_eq!(extract_finish("Hickory Hand-Scraped Plank"), "Hand-Scraped");
    assert_eq!(extract_finish("Distressed Maple"), "Hand-Scraped");
}

#[test]
fn coating_technology_terms() {
    assert_eq!(extract_finish("UV Cured Urethane Oak"), "UV Urethane");
    assert_eq!(extract_finish("Aluminum Oxide Finish Hickory"), "Aluminum Oxide");
    assert_eq!(extract_finish("Oil-Based Poly Walnut"), "Oil-Based Poly");
}

#[test]
fn unfinished_finish() {
    assert_eq!(extract_finish("Unfinished Red Oak"), "Unfinished");
}

#[test]
fn finish_defaults_to_uv_urethane() {
    assert_eq!(extract_finish("White Oak Plank"), "UV Urethane");
}

// ---------------------------------------------------------------------------
// Grade
// ---------------------------------------------------------------------------

#[test]
fn select_and_premium_map_to_select() {
    assert_eq!(extract_grade("Select White Oak"), "Select");
    assert_eq!(extract_grade("Premium Maple Plank"), "Select");
}

#[test]
fn numbered_common_grades() {
    assert_eq!(extract_grade("#1 Common Red Oak"), "#1 Common");
    assert_eq!(extract_grade("2 Common Hickory"), "#2 Common");
}

#[test]
fn cabin_maps_to_rustic() {
    assert_eq!(extract_grade("Cabin Grade Oak"), "Rustic");
}

#[test]
fn grade_defaults_to_character() {
    assert_eq!(extract_grade("White Oak Plank"), "Character");
}

// ---------------------------------------------------------------------------
// Hardness
// ---------------------------------------------------------------------------

#[test]
fn janka_lookup_for_known_species() {
    assert_eq!(janka_hardness("Brazilian Cherry"), 2350);
    assert_eq!(janka_hardness("White Oak"), 1360);
}

#[test]
fn janka_defaults_to_1000_for_unknown() {
    assert_eq!(janka_hardness("Zebrawood"), 1000);
}

// ---------------------------------------------------------------------------
// Assembled attributes
// ---------------------------------------------------------------------------

#[test]
fn parse_title_assembles_all_fields() {
    let attrs = parse_title("Bruce White Oak Solid Hardwood 3/4 in. Thick x 5 in. Wide");
    assert_eq!(attrs.species.as_deref(), Some("White Oak"));
    assert_eq!(attrs.thickness, Some(0.75));
    assert_eq!(attrs.width, Some(5.0));
    assert_eq!(attrs.length, None);
    assert_eq!(attrs.finish, "UV Urethane");
    assert_eq!(attrs.grade, "Character");
    assert_eq!(attrs.janka_hardness, 1360);
}

#[test]
fn parse_title_without_species_defaults_hardness() {
    let attrs = parse_title("Gray Luxury Plank 6 x 48");
    assert!(attrs.species.is_none());
    assert_eq!(attrs.janka_hardness, 1000);
}
