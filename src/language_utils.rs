use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for the translation pipeline
///
/// Users may name the source language by ISO 639-1 code, ISO 639-2 code or
/// English name ("Spanish", "Chinese (Mandarin)"). Backends speak ISO 639-1,
/// so everything is normalized to that form before a run starts.

/// Marker accepted by remote backends for automatic source detection
pub const AUTO_DETECT: &str = "auto";

/// The only target language backends are asked to produce
pub const TARGET_LANGUAGE: &str = "en";

/// Source languages supported by the translation backends (ISO 639-1)
pub const SUPPORTED_SOURCE_LANGUAGES: [&str; 2] = ["es", "zh"];

// ISO 639-2/B codes that differ from their 639-2/T form
fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    match code {
        "fre" => Some("fra"),
        "ger" => Some("deu"),
        "dut" => Some("nld"),
        "gre" => Some("ell"),
        "chi" => Some("zho"),
        "cze" => Some("ces"),
        "per" => Some("fas"),
        "rum" => Some("ron"),
        "slo" => Some("slk"),
        "wel" => Some("cym"),
        _ => None,
    }
}

fn lookup(code_or_name: &str) -> Option<Language> {
    let normalized = code_or_name.trim().to_lowercase();

    match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => {
            let part2t = bibliographic_to_terminology(&normalized).unwrap_or(&normalized);
            Language::from_639_3(part2t)
        }
        _ => {
            // "Chinese (Mandarin)" -> "Chinese"
            let name = match normalized.find('(') {
                Some(pos) => normalized[..pos].trim(),
                None => normalized.as_str(),
            };
            if name == "mandarin" {
                return Language::from_639_3("zho");
            }
            let mut chars = name.chars();
            let capitalized = match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => return None,
            };
            Language::from_name(&capitalized)
        }
    }
}

/// Normalize a language code or English name to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code or name to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let lang = lookup(code)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    // Mandarin is tagged separately in ISO 639-3 but backends expect "zh"
    if lang.to_639_3() == "cmn" {
        return Ok("zh".to_string());
    }

    Ok(lang
        .to_639_1()
        .map(|c| c.to_string())
        .unwrap_or_else(|| lang.to_639_3().to_string()))
}

/// Normalize a user supplied source language to a backend code
///
/// Accepts "auto" and anything resolving to Spanish or Chinese.
pub fn normalize_source_language(input: &str) -> Result<String> {
    if input.trim().eq_ignore_ascii_case(AUTO_DETECT) {
        return Ok(AUTO_DETECT.to_string());
    }

    let code = normalize_to_part1_or_part2t(input)?;
    if SUPPORTED_SOURCE_LANGUAGES.contains(&code.as_str()) {
        Ok(code)
    } else {
        Err(anyhow!(
            "Unsupported source language: {} (supported: Spanish, Chinese or auto)",
            input
        ))
    }
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    if code.trim().eq_ignore_ascii_case(AUTO_DETECT) {
        return Ok("Auto-detected".to_string());
    }

    let lang = lookup(code).ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;
    Ok(lang.to_name().to_string())
}
