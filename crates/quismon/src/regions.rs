//! Static catalog of probe regions.
//!
//! The catalog is compiled in; there is no API call behind it. Codes follow
//! `<continent>-<direction>-<airport>`. Two generations of older codes are
//! still accepted by [`validate_region`]: the catalog's own legacy entry and
//! three cloud-style codes that predate the catalog entirely.

use crate::error::{Error, Result};

/// One probe location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub code: &'static str,
    pub display_name: &'static str,
    pub city: &'static str,
    pub country: &'static str,
    pub continent: &'static str,
    pub legacy: bool,
}

const fn region(
    code: &'static str,
    display_name: &'static str,
    city: &'static str,
    country: &'static str,
    continent: &'static str,
) -> Region {
    Region {
        code,
        display_name,
        city,
        country,
        continent,
        legacy: false,
    }
}

/// Every catalog region, in declaration order (grouped by continent).
pub const REGIONS: &[Region] = &[
    region("na-east-ewr", "Newark, USA (NYC Metro)", "Newark", "United States", "na"),
    region("na-west-sjc", "Silicon Valley, USA", "Silicon Valley", "United States", "na"),
    region("na-west-lax", "Los Angeles, USA", "Los Angeles", "United States", "na"),
    region("na-west-sea", "Seattle, USA", "Seattle", "United States", "na"),
    region("na-central-dfw", "Dallas, USA", "Dallas", "United States", "na"),
    region("na-central-ord", "Chicago, USA", "Chicago", "United States", "na"),
    region("na-east-mia", "Miami, USA", "Miami", "United States", "na"),
    region("na-east-atl", "Atlanta, USA", "Atlanta", "United States", "na"),
    region("na-east-yto", "Toronto, Canada", "Toronto", "Canada", "na"),
    region("na-central-mex", "Mexico City, Mexico", "Mexico City", "Mexico", "na"),
    region("sa-east-sao", "São Paulo, Brazil", "São Paulo", "Brazil", "sa"),
    region("sa-west-scl", "Santiago, Chile", "Santiago", "Chile", "sa"),
    region("eu-west-ams", "Amsterdam, Netherlands", "Amsterdam", "Netherlands", "eu"),
    region("eu-west-lhr", "London, UK", "London", "United Kingdom", "eu"),
    region("eu-west-man", "Manchester, UK", "Manchester", "United Kingdom", "eu"),
    region("eu-central-fra", "Frankfurt, Germany", "Frankfurt", "Germany", "eu"),
    region("eu-west-cdg", "Paris, France", "Paris", "France", "eu"),
    region("eu-south-mad", "Madrid, Spain", "Madrid", "Spain", "eu"),
    region("eu-north-waw", "Warsaw, Poland", "Warsaw", "Poland", "eu"),
    region("eu-north-sto", "Stockholm, Sweden", "Stockholm", "Sweden", "eu"),
    region("ap-northeast-nrt", "Tokyo, Japan", "Tokyo", "Japan", "ap"),
    region("ap-northeast-itm", "Osaka, Japan", "Osaka", "Japan", "ap"),
    region("ap-northeast-icn", "Seoul, South Korea", "Seoul", "South Korea", "ap"),
    region("ap-southeast-sin", "Singapore", "Singapore", "Singapore", "ap"),
    region("ap-south-bom", "Mumbai, India", "Mumbai", "India", "ap"),
    region("ap-south-del", "Delhi NCR, India", "Delhi NCR", "India", "ap"),
    region("ap-south-blr", "Bangalore, India", "Bangalore", "India", "ap"),
    region("ap-west-tlv", "Tel Aviv, Israel", "Tel Aviv", "Israel", "ap"),
    region("au-southeast-syd", "Sydney, Australia", "Sydney", "Australia", "au"),
    region("au-south-mel", "Melbourne, Australia", "Melbourne", "Australia", "au"),
    region("af-south-jnb", "Johannesburg, South Africa", "Johannesburg", "South Africa", "af"),
    Region {
        code: "fr-par-1",
        display_name: "Paris, France (Legacy)",
        city: "Paris",
        country: "France",
        continent: "eu",
        legacy: true,
    },
];

/// Cloud-style codes accepted for existing configurations but not listed.
pub const DEPRECATED_CODES: &[&str] = &["us-east-1", "eu-west-1", "ap-southeast-1"];

/// Region assigned to checks that do not specify any.
pub const DEFAULT_REGION: &str = "us-east-1";

/// The catalog sorted by code.
pub fn catalog() -> Vec<Region> {
    let mut regions = REGIONS.to_vec();
    regions.sort_by_key(|r| r.code);
    regions
}

pub fn find(code: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.code == code)
}

/// Accepts catalog codes (legacy included) and the deprecated cloud-style codes.
pub fn validate_region(code: &str) -> Result<()> {
    if find(code).is_some() || DEPRECATED_CODES.contains(&code) {
        Ok(())
    } else {
        Err(Error::InvalidRegion(code.to_string()))
    }
}

pub fn is_deprecated(code: &str) -> bool {
    DEPRECATED_CODES.contains(&code) || find(code).is_some_and(|r| r.legacy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sorted_and_complete() {
        let regions = catalog();
        assert_eq!(regions.len(), 32);
        assert!(regions.windows(2).all(|w| w[0].code < w[1].code));
        assert_eq!(regions[0].code, "af-south-jnb");
    }

    #[test]
    fn test_catalog_codes_unique() {
        let mut codes: Vec<_> = REGIONS.iter().map(|r| r.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), REGIONS.len());
    }

    #[test]
    fn test_validate_region() {
        assert!(validate_region("na-east-ewr").is_ok());
        assert!(validate_region("us-east-1").is_ok());
        assert!(validate_region("fr-par-1").is_ok());

        let err = validate_region("xx-bogus-1").unwrap_err();
        assert!(err.to_string().contains("invalid region code: xx-bogus-1"));
    }

    #[test]
    fn test_deprecated_codes_not_in_catalog() {
        for code in DEPRECATED_CODES {
            assert!(find(code).is_none());
            assert!(is_deprecated(code));
        }
        assert!(is_deprecated("fr-par-1"));
        assert!(!is_deprecated("eu-central-fra"));
    }

    #[test]
    fn test_default_region_is_valid() {
        assert!(validate_region(DEFAULT_REGION).is_ok());
    }
}
