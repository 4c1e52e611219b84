/// A selectable country with its international dial code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub code: &'static str,
    pub dial_code: &'static str,
    pub name: &'static str,
}

/// Country used when the form has no explicit selection
pub const DEFAULT_COUNTRY_CODE: &str = "IN";

/// Selection order matters for shared dial codes: +1 resolves to US before CA.
pub static COUNTRIES: &[Country] = &[
    Country { code: "IN", dial_code: "+91", name: "India" },
    Country { code: "US", dial_code: "+1", name: "United States" },
    Country { code: "CA", dial_code: "+1", name: "Canada" },
    Country { code: "GB", dial_code: "+44", name: "United Kingdom" },
    Country { code: "AU", dial_code: "+61", name: "Australia" },
    Country { code: "DE", dial_code: "+49", name: "Germany" },
    Country { code: "FR", dial_code: "+33", name: "France" },
    Country { code: "IT", dial_code: "+39", name: "Italy" },
    Country { code: "ES", dial_code: "+34", name: "Spain" },
    Country { code: "MX", dial_code: "+52", name: "Mexico" },
    Country { code: "JP", dial_code: "+81", name: "Japan" },
    Country { code: "CN", dial_code: "+86", name: "China" },
    Country { code: "KR", dial_code: "+82", name: "South Korea" },
    Country { code: "BR", dial_code: "+55", name: "Brazil" },
    Country { code: "RU", dial_code: "+7", name: "Russia" },
    Country { code: "ZA", dial_code: "+27", name: "South Africa" },
    Country { code: "NG", dial_code: "+234", name: "Nigeria" },
    Country { code: "EG", dial_code: "+20", name: "Egypt" },
    Country { code: "SA", dial_code: "+966", name: "Saudi Arabia" },
    Country { code: "AE", dial_code: "+971", name: "United Arab Emirates" },
    Country { code: "SG", dial_code: "+65", name: "Singapore" },
    Country { code: "MY", dial_code: "+60", name: "Malaysia" },
    Country { code: "TH", dial_code: "+66", name: "Thailand" },
    Country { code: "VN", dial_code: "+84", name: "Vietnam" },
    Country { code: "PH", dial_code: "+63", name: "Philippines" },
    Country { code: "ID", dial_code: "+62", name: "Indonesia" },
    Country { code: "PK", dial_code: "+92", name: "Pakistan" },
    Country { code: "BD", dial_code: "+880", name: "Bangladesh" },
    Country { code: "NZ", dial_code: "+64", name: "New Zealand" },
    Country { code: "AR", dial_code: "+54", name: "Argentina" },
    Country { code: "CL", dial_code: "+56", name: "Chile" },
    Country { code: "CO", dial_code: "+57", name: "Colombia" },
    Country { code: "PE", dial_code: "+51", name: "Peru" },
    Country { code: "NL", dial_code: "+31", name: "Netherlands" },
    Country { code: "BE", dial_code: "+32", name: "Belgium" },
    Country { code: "SE", dial_code: "+46", name: "Sweden" },
    Country { code: "NO", dial_code: "+47", name: "Norway" },
    Country { code: "DK", dial_code: "+45", name: "Denmark" },
    Country { code: "FI", dial_code: "+358", name: "Finland" },
    Country { code: "PL", dial_code: "+48", name: "Poland" },
    Country { code: "AT", dial_code: "+43", name: "Austria" },
    Country { code: "CH", dial_code: "+41", name: "Switzerland" },
    Country { code: "PT", dial_code: "+351", name: "Portugal" },
    Country { code: "GR", dial_code: "+30", name: "Greece" },
    Country { code: "TR", dial_code: "+90", name: "Turkey" },
    Country { code: "IL", dial_code: "+972", name: "Israel" },
    Country { code: "IE", dial_code: "+353", name: "Ireland" },
    Country { code: "NP", dial_code: "+977", name: "Nepal" },
    Country { code: "LK", dial_code: "+94", name: "Sri Lanka" },
];

/// Look up a country by ISO code (case-insensitive)
pub fn country_by_code(code: &str) -> Option<&'static Country> {
    COUNTRIES
        .iter()
        .find(|country| country.code.eq_ignore_ascii_case(code))
}

pub fn default_country() -> &'static Country {
    &COUNTRIES[0]
}

/// Country whose dial code is the longest prefix of `phone`
pub fn country_for_phone(phone: &str) -> Option<&'static Country> {
    let mut best: Option<&'static Country> = None;
    for country in COUNTRIES {
        if phone.starts_with(country.dial_code)
            && best.map_or(true, |b| country.dial_code.len() > b.dial_code.len())
        {
            best = Some(country);
        }
    }
    best
}

/// Insert a space after the dial code, e.g. `+919876543210` -> `+91 9876543210`
pub fn format_phone(phone: &str) -> String {
    match country_for_phone(phone) {
        Some(country) => format!(
            "{} {}",
            country.dial_code,
            &phone[country.dial_code.len()..]
        ),
        None => phone.to_string(),
    }
}

/// Split a dial-code-prefixed phone back into its country and local number.
///
/// An explicit country code wins over prefix detection so that shared dial
/// codes (US/CA) keep the user's original selection.
pub fn split_phone(phone: &str, country_code: Option<&str>) -> (&'static Country, String) {
    if let Some(country) = country_code.and_then(country_by_code) {
        if let Some(number) = phone.strip_prefix(country.dial_code) {
            return (country, number.to_string());
        }
    }

    match country_for_phone(phone) {
        Some(country) => (country, phone[country.dial_code.len()..].to_string()),
        None => (default_country(), phone.to_string()),
    }
}
