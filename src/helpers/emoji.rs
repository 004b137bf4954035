//! Country flag glyphs keyed by ISO 3166-1 alpha-2 code.

/// Known two-letter codes, sorted for binary search.
/// Includes the non-ISO codes EU, UN and XK, which have flag glyphs.
const COUNTRY_CODES: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX", "AZ",
    "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ", "BR", "BS",
    "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK", "CL", "CM", "CN",
    "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM", "DO", "DZ", "EC", "EE",
    "EG", "EH", "ER", "ES", "ET", "EU", "FI", "FJ", "FK", "FM", "FO", "FR", "GA", "GB", "GD", "GE",
    "GF", "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS", "GT", "GU", "GW", "GY", "HK",
    "HM", "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN", "IO", "IQ", "IR", "IS", "IT", "JE",
    "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN", "KP", "KR", "KW", "KY", "KZ", "LA", "LB",
    "LC", "LI", "LK", "LR", "LS", "LT", "LU", "LV", "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH",
    "MK", "ML", "MM", "MN", "MO", "MP", "MQ", "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ",
    "NA", "NC", "NE", "NF", "NG", "NI", "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF",
    "PG", "PH", "PK", "PL", "PM", "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU",
    "RW", "SA", "SB", "SC", "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR",
    "SS", "ST", "SV", "SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN",
    "TO", "TR", "TT", "TV", "TW", "TZ", "UA", "UG", "UM", "UN", "US", "UY", "UZ", "VA", "VC", "VE",
    "VG", "VI", "VN", "VU", "WF", "WS", "XK", "YE", "YT", "ZA", "ZM", "ZW",
];

/// First regional indicator symbol (🇦).
const REGIONAL_INDICATOR_A: u32 = 0x1F1E6;

/// Returns the flag glyph for a country code, matching case-insensitively.
pub(crate) fn country_flag(code: &str) -> Option<String> {
    let code = code.trim().to_ascii_uppercase();
    COUNTRY_CODES.binary_search(&code.as_str()).ok()?;
    code.chars()
        .map(|letter| char::from_u32(REGIONAL_INDICATOR_A + (letter as u32 - 'A' as u32)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_sorted() {
        assert!(COUNTRY_CODES.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn known_codes_map_to_flags() {
        assert_eq!(country_flag("CH").as_deref(), Some("🇨🇭"));
        assert_eq!(country_flag("de").as_deref(), Some("🇩🇪"));
        assert_eq!(country_flag("eu").as_deref(), Some("🇪🇺"));
    }

    #[test]
    fn unknown_codes_have_no_flag() {
        assert_eq!(country_flag("XX"), None);
        assert_eq!(country_flag("Schweiz"), None);
        assert_eq!(country_flag(""), None);
    }
}
