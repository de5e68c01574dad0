use regex::Regex;

/// A configured item is either a bare market hash name or a full community
/// market listing URL. Classified once at config load, resolved into a
/// (listing link, display name) pair right away.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    Name(String),
    ListingUrl(String),
}

impl Identifier {
    pub fn from_raw(raw: &str) -> Self {
        if raw.starts_with("https://") || raw.starts_with("http://") {
            Identifier::ListingUrl(raw.to_string())
        } else {
            Identifier::Name(raw.to_string())
        }
    }

    /// Normalizes into `(listing link, market hash name)` for the given app.
    pub fn resolve(&self, appid: u32) -> (String, String) {
        match self {
            Identifier::Name(name) => (ensure_link(name, appid), name.clone()),
            Identifier::ListingUrl(link) => (link.clone(), extract_name_from_link(link, appid)),
        }
    }
}

/// Builds the listing URL for a bare item name.
pub fn ensure_link(name: &str, appid: u32) -> String {
    format!(
        "https://steamcommunity.com/market/listings/{}/{}",
        appid,
        urlencoding::encode(name)
    )
}

/// Pulls the market hash name back out of a listing URL. The name is the
/// path segment after `/{appid}/`, minus query string and trailing slash.
/// Anything surprising falls back to the raw input as the display name.
pub fn extract_name_from_link(link: &str, appid: u32) -> String {
    let marker = format!("/{}/", appid);
    let Some((_, rest)) = link.split_once(&marker) else {
        return link.to_string();
    };

    let encoded = rest
        .split(['?', '#'])
        .next()
        .unwrap_or(rest)
        .trim_end_matches('/');
    if encoded.is_empty() {
        return link.to_string();
    }

    match urlencoding::decode(encoded) {
        Ok(name) => name.into_owned(),
        Err(_) => encoded.to_string(),
    }
}

/// Parses a localized currency string like `"1,23 zł"`, `"$2.50"` or
/// `"1 234,56zł"` into a number. When both separators show up, the rightmost
/// one is the decimal point and the other is thousands grouping; a lone
/// comma is a decimal point (Steam's European locales).
pub fn parse_price(raw: &str) -> Option<f64> {
    let numeric = Regex::new(r"[0-9][0-9 \u{a0}.,]*").ok()?;
    let mut token = numeric
        .find(raw)?
        .as_str()
        .replace([' ', '\u{a0}'], "");
    token = token.trim_end_matches(['.', ',']).to_string();

    let cleaned = match (token.rfind('.'), token.rfind(',')) {
        (Some(dot), Some(comma)) if dot > comma => token.replace(',', ""),
        (Some(_), Some(_)) => token.replace('.', "").replace(',', "."),
        (None, Some(_)) => token.replace(',', "."),
        _ => token,
    };

    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_become_listing_links() {
        let ident = Identifier::from_raw("Fracture Case");
        assert_eq!(ident, Identifier::Name("Fracture Case".to_string()));

        let (link, name) = ident.resolve(730);
        assert_eq!(
            link,
            "https://steamcommunity.com/market/listings/730/Fracture%20Case"
        );
        assert_eq!(name, "Fracture Case");
    }

    #[test]
    fn listing_urls_keep_the_link_and_recover_the_name() {
        let raw = "https://steamcommunity.com/market/listings/730/AK-47%20%7C%20Redline%20%28Field-Tested%29";
        let ident = Identifier::from_raw(raw);
        assert!(matches!(ident, Identifier::ListingUrl(_)));

        let (link, name) = ident.resolve(730);
        assert_eq!(link, raw);
        assert_eq!(name, "AK-47 | Redline (Field-Tested)");
    }

    #[test]
    fn name_extraction_strips_query_and_trailing_slash() {
        assert_eq!(
            extract_name_from_link(
                "https://steamcommunity.com/market/listings/730/Fracture%20Case/?l=english",
                730
            ),
            "Fracture Case"
        );
    }

    #[test]
    fn name_extraction_falls_back_to_the_raw_link() {
        let odd = "https://steamcommunity.com/market/search?appid=730";
        assert_eq!(extract_name_from_link(odd, 730), odd);
    }

    #[test]
    fn parses_polish_prices() {
        assert_eq!(parse_price("1,23 zł"), Some(1.23));
        assert_eq!(parse_price("1 234,56zł"), Some(1234.56));
    }

    #[test]
    fn parses_dollar_prices() {
        assert_eq!(parse_price("$2.50"), Some(2.5));
        assert_eq!(parse_price("$1,234.56"), Some(1234.56));
    }

    #[test]
    fn rejects_priceless_strings() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("sold out"), None);
    }

    #[test]
    fn single_comma_is_a_decimal_point() {
        assert_eq!(parse_price("0,03€"), Some(0.03));
    }
}
