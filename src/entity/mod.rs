//! Cookbook entities and their generic-record representation.
//!
//! Callers exchange loosely-typed [`GenericRecord`]s; the backing service
//! works with typed [`Recipe`] and [`Ingredient`] values. Conversion in both
//! directions goes through explicit per-kind field lists.

mod record;

pub use record::FieldReader;

use crate::error::{CookbookError, CookbookResult};
use chrono::{DateTime, Utc};
use record::{put, timestamp_value};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

/// Loosely-typed key/value representation used at the caller boundary.
pub type GenericRecord = serde_json::Map<String, Value>;

/// Fully-qualified type name identifying a recipe.
pub const RECIPE_QUALIFIER: &str = "com.cookbook.tutorial.service.Recipe";

/// Fully-qualified type name identifying an ingredient.
pub const INGREDIENT_QUALIFIER: &str = "com.cookbook.tutorial.service.Ingredient";

/// Logical type of a cookbook entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Recipe,
    Ingredient,
}

impl EntityKind {
    /// Short tag, also used as the REST path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Recipe => "recipe",
            EntityKind::Ingredient => "ingredient",
        }
    }

    /// Fully-qualified type name of this kind.
    pub fn qualifier(&self) -> &'static str {
        match self {
            EntityKind::Recipe => RECIPE_QUALIFIER,
            EntityKind::Ingredient => INGREDIENT_QUALIFIER,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact match on the short tag (`"recipe"` / `"ingredient"`).
impl FromStr for EntityKind {
    type Err = CookbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recipe" => Ok(EntityKind::Recipe),
            "ingredient" => Ok(EntityKind::Ingredient),
            other => Err(CookbookError::UnknownEntityKind(other.to_string())),
        }
    }
}

/// Resolves the entity kind named by a caller-supplied type tag.
///
/// Matching is by substring: any tag *containing* a kind's qualifier
/// resolves to that kind, so `"xxcom.cookbook.tutorial.service.Recipeyy"`
/// is a recipe. Recipe is checked before ingredient.
///
/// # Examples
///
/// ```
/// use cookbook::entity::{resolve_kind, EntityKind};
///
/// let kind = resolve_kind("com.cookbook.tutorial.service.Ingredient").unwrap();
/// assert_eq!(kind, EntityKind::Ingredient);
/// assert!(resolve_kind("unknown.Type").is_err());
/// ```
pub fn resolve_kind(type_tag: &str) -> CookbookResult<EntityKind> {
    if type_tag.contains(RECIPE_QUALIFIER) {
        Ok(EntityKind::Recipe)
    } else if type_tag.contains(INGREDIENT_QUALIFIER) {
        Ok(EntityKind::Ingredient)
    } else {
        Err(CookbookError::UnknownEntityKind(type_tag.to_string()))
    }
}

/// Measurement unit of an ingredient quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitType {
    Unit,
    Spoons,
    Grams,
    Pounds,
}

impl UnitType {
    const ALL: [UnitType; 4] = [
        UnitType::Unit,
        UnitType::Spoons,
        UnitType::Grams,
        UnitType::Pounds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Unit => "UNIT",
            UnitType::Spoons => "SPOONS",
            UnitType::Grams => "GRAMS",
            UnitType::Pounds => "POUNDS",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.as_str() == s)
    }
}

/// Shared behaviour of typed entities.
pub trait Entity: Sized {
    /// Kind this entity type represents.
    const KIND: EntityKind;

    /// Every field name the record representation may carry.
    const FIELDS: &'static [&'static str];

    /// Server-assigned identifier, absent before creation.
    fn id(&self) -> Option<i64>;

    /// Reads the entity's fields; unknown keys are checked by the caller.
    fn read(reader: &FieldReader<'_>) -> CookbookResult<Self>;

    fn to_record(&self) -> GenericRecord;

    fn from_record(record: &GenericRecord) -> CookbookResult<Self> {
        let reader = FieldReader::new(record);
        reader.reject_unknown(Self::FIELDS)?;
        Self::read(&reader)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ingredient {
    pub id: Option<i64>,
    pub name: Option<String>,
    /// Kept as received so `1` and `1.0` survive a round trip
    pub quantity: Option<Number>,
    pub unit: Option<UnitType>,
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl Entity for Ingredient {
    const KIND: EntityKind = EntityKind::Ingredient;
    const FIELDS: &'static [&'static str] =
        &["id", "name", "quantity", "unit", "created", "lastModified"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn read(reader: &FieldReader<'_>) -> CookbookResult<Self> {
        let unit = match reader.optional_string("unit")? {
            None => None,
            Some(s) => Some(UnitType::parse(&s).ok_or_else(|| {
                CookbookError::invalid_field(
                    reader.path("unit"),
                    format!(
                        "unknown unit '{}' (expected one of UNIT, SPOONS, GRAMS, POUNDS)",
                        s
                    ),
                )
            })?),
        };

        Ok(Self {
            id: reader.optional_i64("id")?,
            name: reader.optional_string("name")?,
            quantity: reader.optional_number("quantity")?,
            unit,
            created: reader.optional_timestamp("created")?,
            last_modified: reader.optional_timestamp("lastModified")?,
        })
    }

    fn to_record(&self) -> GenericRecord {
        let mut record = GenericRecord::new();
        put(&mut record, "id", self.id);
        put(&mut record, "name", self.name.clone());
        put(&mut record, "quantity", self.quantity.clone());
        put(&mut record, "unit", self.unit.map(|u| u.as_str()));
        put(&mut record, "created", self.created.map(timestamp_value));
        put(&mut record, "lastModified", self.last_modified.map(timestamp_value));
        record
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Recipe {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub prep_time: Option<Number>,
    pub cook_time: Option<Number>,
    pub directions: Option<Vec<String>>,
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl Entity for Recipe {
    const KIND: EntityKind = EntityKind::Recipe;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "ingredients",
        "prepTime",
        "cookTime",
        "directions",
        "created",
        "lastModified",
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn read(reader: &FieldReader<'_>) -> CookbookResult<Self> {
        let ingredients = match reader.optional_record_list("ingredients")? {
            None => None,
            Some(items) => Some(
                items
                    .into_iter()
                    .map(|(path, nested)| {
                        let nested = FieldReader::nested(nested, path);
                        nested.reject_unknown(Ingredient::FIELDS)?;
                        Ingredient::read(&nested)
                    })
                    .collect::<CookbookResult<Vec<_>>>()?,
            ),
        };

        Ok(Self {
            id: reader.optional_i64("id")?,
            name: reader.optional_string("name")?,
            ingredients,
            prep_time: reader.optional_number("prepTime")?,
            cook_time: reader.optional_number("cookTime")?,
            directions: reader.optional_string_list("directions")?,
            created: reader.optional_timestamp("created")?,
            last_modified: reader.optional_timestamp("lastModified")?,
        })
    }

    fn to_record(&self) -> GenericRecord {
        let mut record = GenericRecord::new();
        put(&mut record, "id", self.id);
        put(&mut record, "name", self.name.clone());
        put(
            &mut record,
            "ingredients",
            self.ingredients.as_ref().map(|items| {
                items
                    .iter()
                    .map(|i| Value::Object(i.to_record()))
                    .collect::<Vec<_>>()
            }),
        );
        put(&mut record, "prepTime", self.prep_time.clone());
        put(&mut record, "cookTime", self.cook_time.clone());
        put(&mut record, "directions", self.directions.clone());
        put(&mut record, "created", self.created.map(timestamp_value));
        put(&mut record, "lastModified", self.last_modified.map(timestamp_value));
        record
    }
}

/// A typed entity of either kind, as exchanged with the backing client.
#[derive(Clone, Debug, PartialEq)]
pub enum CookbookEntity {
    Recipe(Recipe),
    Ingredient(Ingredient),
}

impl CookbookEntity {
    /// Converts `record` into the variant selected by `kind`.
    pub fn from_record(kind: EntityKind, record: &GenericRecord) -> CookbookResult<Self> {
        match kind {
            EntityKind::Recipe => Recipe::from_record(record).map(CookbookEntity::Recipe),
            EntityKind::Ingredient => {
                Ingredient::from_record(record).map(CookbookEntity::Ingredient)
            }
        }
    }

    pub fn to_record(&self) -> GenericRecord {
        match self {
            CookbookEntity::Recipe(r) => r.to_record(),
            CookbookEntity::Ingredient(i) => i.to_record(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            CookbookEntity::Recipe(_) => Recipe::KIND,
            CookbookEntity::Ingredient(_) => Ingredient::KIND,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            CookbookEntity::Recipe(r) => r.id(),
            CookbookEntity::Ingredient(i) => i.id(),
        }
    }
}

impl From<Recipe> for CookbookEntity {
    fn from(recipe: Recipe) -> Self {
        CookbookEntity::Recipe(recipe)
    }
}

impl From<Ingredient> for CookbookEntity {
    fn from(ingredient: Ingredient) -> Self {
        CookbookEntity::Ingredient(ingredient)
    }
}
