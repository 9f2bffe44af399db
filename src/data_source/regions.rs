//! `data.quismon_regions` - the static probe region catalog

use declarative::{Attribute, DataSource, Result, Schema};
use serde::{Deserialize, Serialize};

pub const TYPE_NAME: &str = "quismon_regions";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionEntry {
    pub code: String,
    pub display_name: String,
    pub city: String,
    pub country: String,
    pub continent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionList {
    pub regions: Vec<RegionEntry>,
}

impl From<quismon::Region> for RegionEntry {
    fn from(region: quismon::Region) -> Self {
        Self {
            code: region.code.to_string(),
            display_name: region.display_name.to_string(),
            city: region.city.to_string(),
            country: region.country.to_string(),
            continent: region.continent.to_string(),
        }
    }
}

/// Needs no client: the catalog is compiled in.
pub struct RegionsDataSource;

impl DataSource for RegionsDataSource {
    type Model = RegionList;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new("Lists the probe regions checks can run from.").attribute(
            Attribute::object_list("regions")
                .computed()
                .describe("code, display_name, city, country and continent, sorted by code"),
        )
    }

    fn read(&self, _config: RegionList) -> Result<RegionList> {
        Ok(RegionList {
            regions: quismon::regions::catalog().into_iter().map(RegionEntry::from).collect(),
        })
    }
}
