use crate::genetics::types::{ColorProbability, DogGenotype, UNKNOWN};
use std::collections::BTreeMap;

const SHARED_COLOR_WEIGHT: f64 = 0.9;
const MIXED_COLOR_WEIGHT: f64 = 0.45;
const OTHER_COLOR: &str = "Other";


fn hex_for(color: &str) -> Option<&'static str> {
    let hex = match color {
        "Black" => "#1C1C1C",
        "Chocolate" => "#5C3317",
        "Blue" => "#6E7F80",
        "Lilac" => "#B4A6A8",
        "Yellow" => "#F2D16B",
        "Cream" => "#F3E5AB",
        "Red" => "#A0522D",
        "Fawn" => "#E5AA70",
        "Apricot" => "#FBCEB1",
        "White" => "#F8F8F8",
        "Gray" | "Grey" | "Silver" => "#9E9E9E",
        "Sable" => "#C19A6B",
        "Brindle" => "#6F4E37",
        "Merle" => "#8C92AC",
        _ => return None,
    };
    Some(hex)
}

/// "black " -> "Black", "" -> "Unknown".
fn normalize_color(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNKNOWN) {
        return UNKNOWN.to_string();
    }
    let lower = trimmed.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => UNKNOWN.to_string(),
    }
}

/// Folds kennel-club synonyms onto the names the B/D cross produces.
fn canonical_color(color: String) -> String {
    match color.as_str() {
        "Brown" | "Liver" => "Chocolate".to_string(),
        "Isabella" => "Lilac".to_string(),
        _ => color,
    }
}

fn phenotype(genotype: &DogGenotype) -> String {
    let base = canonical_color(normalize_color(&genotype.base_color));
    if base != UNKNOWN {
        return base;
    }
    // Some labs only report a phenotype label next to the loci.
    ["phenotype", "color", "coatColor"]
        .iter()
        .filter_map(|key| genotype.color_genetics.get(*key))
        .filter_map(|v| v.as_str())
        .map(|c| canonical_color(normalize_color(c)))
        .find(|c| c != UNKNOWN)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Probability that a parent with this biallelic genotype ("B/b") passes the recessive allele.
/// `None` if the genotype is not a parseable pair of `dominant`/`recessive` alleles.
fn recessive_gamete_probability(genotype: &str, dominant: char, recessive: char) -> Option<f64> {
    let mut alleles = genotype.split('/').map(str::trim);
    let (a, b) = (alleles.next()?, alleles.next()?);
    if alleles.next().is_some() {
        return None;
    }

    let mut recessive_count = 0u8;
    for allele in [a, b] {
        let mut chars = allele.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if c == recessive {
            recessive_count += 1;
        } else if c != dominant {
            return None;
        }
    }
    Some(recessive_count as f64 / 2.0)
}

fn entry(color: &str, probability: f64) -> ColorProbability {
    ColorProbability {
        color: color.to_string(),
        probability,
        hex: hex_for(color).map(str::to_string),
    }
}

fn eumelanin_color(brown: bool, dilute: bool) -> &'static str {
    match (brown, dilute) {
        (false, false) => "Black",
        (true, false) => "Chocolate",
        (false, true) => "Blue",
        (true, true) => "Lilac",
    }
}

/// Color a dog's own B/D genotype expresses, if both loci parse.
fn expressed_color(genotype: &DogGenotype) -> Option<&'static str> {
    let brown = recessive_gamete_probability(&genotype.brown_dilution, 'B', 'b')?;
    let dilute = recessive_gamete_probability(&genotype.dilution, 'D', 'd')?;
    Some(eumelanin_color(brown == 1.0, dilute == 1.0))
}

/// Punnett squares over the B (brown) and D (dilute) loci. Used only when each
/// parent's reported color is the one its own loci express; an unknown or
/// masking color (yellow, red, ...) falls back to the phenotype policy.
fn predict_from_loci(sire: &DogGenotype, dam: &DogGenotype) -> Option<Vec<ColorProbability>> {
    let consistent = |g: &DogGenotype| expressed_color(g).map_or(false, |c| c == phenotype(g));
    if !consistent(sire) || !consistent(dam) {
        return None;
    }

    let brown = recessive_gamete_probability(&sire.brown_dilution, 'B', 'b')?
        * recessive_gamete_probability(&dam.brown_dilution, 'B', 'b')?;
    let dilute = recessive_gamete_probability(&sire.dilution, 'D', 'd')?
        * recessive_gamete_probability(&dam.dilution, 'D', 'd')?;

    Some(vec![
        entry(eumelanin_color(false, false), (1.0 - brown) * (1.0 - dilute)),
        entry(eumelanin_color(true, false), brown * (1.0 - dilute)),
        entry(eumelanin_color(false, true), (1.0 - brown) * dilute),
        entry(eumelanin_color(true, true), brown * dilute),
    ])
}

/// Fallback policy on phenotype labels alone: skew toward colors both parents share.
fn predict_from_phenotypes(sire: &DogGenotype, dam: &DogGenotype) -> Vec<ColorProbability> {
    let sire_color = phenotype(sire);
    let dam_color = phenotype(dam);

    match (sire_color.as_str(), dam_color.as_str()) {
        (UNKNOWN, UNKNOWN) => vec![entry(UNKNOWN, 1.0)],
        (UNKNOWN, known) | (known, UNKNOWN) => vec![entry(known, 0.5), entry(UNKNOWN, 0.5)],
        (a, b) if a == b => vec![
            entry(a, SHARED_COLOR_WEIGHT),
            entry(OTHER_COLOR, 1.0 - SHARED_COLOR_WEIGHT),
        ],
        (a, b) => vec![
            entry(a, MIXED_COLOR_WEIGHT),
            entry(b, MIXED_COLOR_WEIGHT),
            entry(OTHER_COLOR, 1.0 - 2.0 * MIXED_COLOR_WEIGHT),
        ],
    }
}

/// Merge duplicate colors, drop empty ones, rescale to sum to 1.0 and sort by
/// descending probability (color name breaks ties).
fn normalize(entries: Vec<ColorProbability>) -> Vec<ColorProbability> {
    let mut merged: BTreeMap<String, f64> = BTreeMap::new();
    for e in entries {
        if e.probability > 0.0 {
            *merged.entry(e.color).or_insert(0.0) += e.probability;
        }
    }

    let total: f64 = merged.values().sum();
    if total <= 0.0 {
        return vec![entry(UNKNOWN, 1.0)];
    }

    let mut result: Vec<ColorProbability> = merged
        .into_iter()
        .map(|(color, p)| entry(&color, p / total))
        .collect();
    result.sort_by(|a, b| {
        b.probability
            .total_cmp(&a.probability)
            .then_with(|| a.color.cmp(&b.color))
    });
    result
}

/// Offspring coat color distribution. Deterministic, non-negative, sums to 1.0.
pub fn predict_colors(sire: Option<&DogGenotype>, dam: Option<&DogGenotype>) -> Vec<ColorProbability> {
    let (Some(sire), Some(dam)) = (sire, dam) else {
        return vec![entry(UNKNOWN, 1.0)];
    };

    let raw = predict_from_loci(sire, dam).unwrap_or_else(|| predict_from_phenotypes(sire, dam));
    normalize(raw)
}
