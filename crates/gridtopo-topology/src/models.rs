use geo::{LineString, Point};
use gridtopo_core::models::{Crs, FeatureId, Tags};
use gridtopo_core::normalize::{parse_capacity, parse_category, parse_voltage, UNKNOWN_CATEGORY};
use gridtopo_geo::ReducedFeature;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tag holding the substation voltage
pub const VOLTAGE_TAG: &str = "voltage";

/// Tag holding the generator output
pub const CAPACITY_TAG: &str = "generator:output:electricity";

/// Tag holding the generator category
pub const CATEGORY_TAG: &str = "generator:method";

pub const NAME_TAG: &str = "name";

/// Fixed substation attributes written before the category columns
pub const SUBSTATION_LEADING_FIELDS: [&str; 5] = ["id", "name", "region", "voltage", "num_generators"];

/// Fixed substation attributes written after the category columns
pub const SUBSTATION_TRAILING_FIELDS: [&str; 2] = ["total_capacity_mw", "tags"];

/// Appended to a category column that would shadow a fixed attribute
const COLUMN_SUFFIX: &str = "_generators";

/// Substation reduced to a point with a normalized voltage
#[derive(Debug, Clone, PartialEq)]
pub struct Substation {
    pub id: FeatureId,
    pub location: Point,
    pub region: String,
    pub name: Option<String>,

    /// Highest circuit voltage in volts, `None` if the tag is unparseable
    pub voltage: Option<u64>,

    pub tags: Tags,
}

impl Substation {
    pub fn from_reduced(feature: ReducedFeature) -> Self {
        let voltage = parse_voltage(feature.tag(VOLTAGE_TAG));
        let name = feature.tag(NAME_TAG).map(str::to_string);
        Self {
            id: feature.id,
            location: feature.location,
            region: feature.region,
            name,
            voltage,
            tags: feature.tags,
        }
    }
}

/// Generator reduced to a point with a normalized capacity
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    pub id: FeatureId,
    pub location: Point,
    pub region: String,
    pub name: Option<String>,

    /// Output in megawatts; `0.0` when the tag is absent or unparseable
    pub capacity_mw: f64,

    /// Category value, `None` for the unknown bucket
    pub category: Option<String>,

    pub tags: Tags,
}

impl Generator {
    pub fn from_reduced(feature: ReducedFeature) -> Self {
        let capacity_mw = parse_capacity(feature.tag(CAPACITY_TAG));
        let category = parse_category(feature.tag(CATEGORY_TAG));
        let name = feature.tag(NAME_TAG).map(str::to_string);
        Self {
            id: feature.id,
            location: feature.location,
            region: feature.region,
            name,
            capacity_mw,
            category,
            tags: feature.tags,
        }
    }

    /// Category bucket name, folding the absent category into `unknown`
    pub fn category_key(&self) -> &str {
        self.category.as_deref().unwrap_or(UNKNOWN_CATEGORY)
    }
}

/// Nearest-substation assignment of one generator
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Position of the substation in the matched substation list
    pub substation: usize,
    pub substation_id: FeatureId,

    /// Distance in metres of the working CRS
    pub distance_m: f64,
}

/// Generator with its match, if any substation was in scope
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedGenerator {
    pub generator: Generator,
    pub nearest: Option<Match>,
}

impl MatchedGenerator {
    pub fn is_matched(&self) -> bool {
        self.nearest.is_some()
    }
}

/// Fixed, ordered set of category breakdown columns.
///
/// Built once from the whole generator population and applied to every
/// substation. Columns are sorted lexically with `unknown` last. A category
/// whose value equals a fixed substation attribute (`region`, `tags`, ...)
/// gets a `_generators` suffix on its column name, repeated until the name is
/// unique; lookups still use the category value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryColumns {
    keys: Vec<String>,
    names: Vec<String>,
    positions: BTreeMap<String, usize>,
}

impl CategoryColumns {
    /// Collect the category vocabulary of a generator population
    pub fn from_generators<'a, I>(generators: I) -> Self
    where
        I: IntoIterator<Item = &'a Generator>,
    {
        let mut named = BTreeSet::new();
        let mut has_unknown = false;
        for generator in generators {
            match &generator.category {
                Some(category) => {
                    named.insert(category.as_str());
                }
                None => has_unknown = true,
            }
        }

        let mut keys: Vec<String> = named.into_iter().map(str::to_string).collect();
        if has_unknown {
            keys.push(UNKNOWN_CATEGORY.to_string());
        }
        Self::from_keys(keys)
    }

    fn from_keys(keys: Vec<String>) -> Self {
        let reserved: BTreeSet<&str> =
            SUBSTATION_LEADING_FIELDS.iter().chain(SUBSTATION_TRAILING_FIELDS.iter()).copied().collect();
        let mut taken: BTreeSet<String> =
            reserved.iter().map(|f| f.to_string()).chain(keys.iter().cloned()).collect();

        let names = keys
            .iter()
            .map(|key| {
                if !reserved.contains(key.as_str()) {
                    return key.clone();
                }
                let mut name = format!("{}{}", key, COLUMN_SUFFIX);
                while taken.contains(&name) {
                    name.push_str(COLUMN_SUFFIX);
                }
                taken.insert(name.clone());
                name
            })
            .collect();

        let positions = keys.iter().enumerate().map(|(i, key)| (key.clone(), i)).collect();
        Self { keys, names, positions }
    }

    /// Column position of a category bucket
    pub fn position(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Output column names, aligned with [`Self::keys`]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Category values in column order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Substation with the statistics of the generators matched to it
#[derive(Debug, Clone, PartialEq)]
pub struct SubstationSummary {
    pub substation: Substation,
    pub num_generators: usize,

    /// Counts aligned with [`CategoryColumns::names`]
    pub breakdown: Vec<usize>,

    pub total_capacity_mw: f64,
}

impl SubstationSummary {
    /// Summary with every aggregate at zero
    pub fn empty(substation: Substation, columns: &CategoryColumns) -> Self {
        Self { substation, num_generators: 0, breakdown: vec![0; columns.len()], total_capacity_mw: 0.0 }
    }

    /// `(column, count)` pairs in column order
    pub fn breakdown_by_name<'a>(
        &'a self,
        columns: &'a CategoryColumns,
    ) -> impl Iterator<Item = (&'a str, usize)> + 'a {
        columns.names().iter().map(String::as_str).zip(self.breakdown.iter().copied())
    }
}

/// Straight connector between a generator and its substation
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub generator_id: FeatureId,
    pub substation_id: FeatureId,
    pub capacity_mw: f64,

    /// Two points: generator first, substation second
    pub geometry: LineString,
}

/// Counters describing one topology build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildReport {
    pub substations_in: usize,
    pub substations_kept: usize,
    pub generators_in: usize,
    pub generators_matched: usize,

    /// Features dropped for invalid geometry
    pub dropped_invalid: usize,
}

/// Result of associating generators with substations
#[derive(Debug, Clone, PartialEq)]
pub struct GridTopology {
    /// CRS of every location and link geometry
    pub crs: Crs,
    pub categories: CategoryColumns,
    pub substations: Vec<SubstationSummary>,
    pub generators: Vec<MatchedGenerator>,
    pub links: Vec<Link>,
    pub report: BuildReport,
}

impl GridTopology {
    /// Attribute names of a substation record, in output order
    pub fn substation_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = SUBSTATION_LEADING_FIELDS.map(String::from).to_vec();
        fields.extend(self.categories.names().iter().cloned());
        fields.push(SUBSTATION_TRAILING_FIELDS[0].to_string());
        fields
    }

    pub fn matched_generators(&self) -> impl Iterator<Item = &MatchedGenerator> {
        self.generators.iter().filter(|g| g.is_matched())
    }
}
