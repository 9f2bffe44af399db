//! Resource and data source traits.
//!
//! A [`Resource`] maps a typed model onto create/read/update/delete calls
//! against some remote system. The planner and executor only see the
//! type-erased [`DynResource`], which works on JSON attribute maps; the
//! blanket impl converts between the two so resource implementations never
//! touch untyped values.
//!
//! # Example
//!
//! ```ignore
//! use declarative::{Attribute, Resource, Result, Schema};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! #[serde(default)]
//! struct NoteModel { id: Option<String>, text: String }
//!
//! struct Note;
//!
//! impl Resource for Note {
//!     type Model = NoteModel;
//!     fn type_name(&self) -> &'static str { "note" }
//!     fn schema(&self) -> Schema {
//!         Schema::new("A note")
//!             .attribute(Attribute::string("id").computed())
//!             .attribute(Attribute::string("text").required())
//!     }
//!     fn create(&self, mut planned: NoteModel) -> Result<NoteModel> {
//!         planned.id = Some("n1".into());
//!         Ok(planned)
//!     }
//!     fn read(&self, current: NoteModel) -> Result<NoteModel> { Ok(current) }
//!     fn update(&self, planned: NoteModel, _prior: &NoteModel) -> Result<NoteModel> { Ok(planned) }
//!     fn delete(&self, _current: &NoteModel) -> Result<()> { Ok(()) }
//! }
//! ```

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::schema::Schema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// A managed resource type.
pub trait Resource: Send + Sync {
    /// Attribute model; field names must match the schema's attribute names.
    type Model: Serialize + DeserializeOwned + Send;

    /// Type name used in addresses, e.g. `quismon_check`.
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Cross-attribute and domain validation beyond what the schema checks.
    ///
    /// Only called once every declared value is known.
    fn validate(&self, _config: &Self::Model) -> Diagnostics {
        Diagnostics::new()
    }

    /// Create the remote object. Returns the full state, computed values included.
    fn create(&self, planned: Self::Model) -> Result<Self::Model>;

    /// Refresh `current` from the remote object.
    ///
    /// Returns [`Error::NotFound`] when the object is gone; the caller drops
    /// the instance from state.
    fn read(&self, current: Self::Model) -> Result<Self::Model>;

    fn update(&self, planned: Self::Model, prior: &Self::Model) -> Result<Self::Model>;

    fn delete(&self, current: &Self::Model) -> Result<()>;

    /// Build a minimal model from an import ID; [`Resource::read`] fills the rest.
    fn import(&self, id: &str) -> Result<Self::Model> {
        Err(Error::InvalidImportId {
            id: id.to_string(),
            expected: format!("{} does not support import", self.type_name()),
        })
    }
}

/// A read-only data source type.
pub trait DataSource: Send + Sync {
    type Model: Serialize + DeserializeOwned + Send;

    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Fill computed attributes from the declared arguments.
    fn read(&self, config: Self::Model) -> Result<Self::Model>;
}

/// Type-erased resource over JSON attribute maps.
pub trait DynResource: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn schema(&self) -> Schema;
    fn validate(&self, config: &Map<String, Value>, unknown: &BTreeSet<String>) -> Diagnostics;
    fn create(&self, planned: &Map<String, Value>) -> Result<Map<String, Value>>;
    fn read(&self, current: &Map<String, Value>) -> Result<Map<String, Value>>;
    fn update(&self, planned: &Map<String, Value>, prior: &Map<String, Value>) -> Result<Map<String, Value>>;
    fn delete(&self, current: &Map<String, Value>) -> Result<()>;
    fn import(&self, id: &str) -> Result<Map<String, Value>>;
}

/// Type-erased data source.
pub trait DynDataSource: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn schema(&self) -> Schema;
    fn validate(&self, config: &Map<String, Value>) -> Diagnostics;
    fn read(&self, config: &Map<String, Value>) -> Result<Map<String, Value>>;
}

pub type BoxedResource = Box<dyn DynResource>;
pub type BoxedDataSource = Box<dyn DynDataSource>;

pub(crate) fn to_model<M: DeserializeOwned>(type_name: &str, attributes: &Map<String, Value>) -> Result<M> {
    serde_json::from_value(Value::Object(attributes.clone())).map_err(|source| Error::State {
        resource_type: type_name.to_string(),
        source,
    })
}

pub(crate) fn from_model<M: Serialize>(type_name: &str, model: &M) -> Result<Map<String, Value>> {
    match serde_json::to_value(model) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::configuration(
            type_name,
            format!("model serialized to {other}, expected an object"),
        )),
        Err(source) => Err(Error::State {
            resource_type: type_name.to_string(),
            source,
        }),
    }
}

/// Drop keys that are not in the schema, so state only carries declared attributes.
fn project(schema: &Schema, mut attributes: Map<String, Value>) -> Map<String, Value> {
    attributes.retain(|key, _| schema.get(key).is_some());
    attributes
}

impl<R: Resource> DynResource for R {
    fn type_name(&self) -> &'static str {
        Resource::type_name(self)
    }

    fn schema(&self) -> Schema {
        Resource::schema(self)
    }

    fn validate(&self, config: &Map<String, Value>, unknown: &BTreeSet<String>) -> Diagnostics {
        let schema = Resource::schema(self);
        let mut diags = schema.validate_config(config, unknown);
        if diags.has_errors() || !unknown.is_empty() {
            return diags;
        }
        match to_model::<R::Model>(Resource::type_name(self), config) {
            Ok(model) => diags.extend(Resource::validate(self, &model)),
            Err(err) => diags.extend(err.into_diagnostics()),
        }
        diags
    }

    fn create(&self, planned: &Map<String, Value>) -> Result<Map<String, Value>> {
        let name = Resource::type_name(self);
        let state = Resource::create(self, to_model(name, planned)?)?;
        Ok(project(&Resource::schema(self), from_model(name, &state)?))
    }

    fn read(&self, current: &Map<String, Value>) -> Result<Map<String, Value>> {
        let name = Resource::type_name(self);
        let state = Resource::read(self, to_model(name, current)?)?;
        Ok(project(&Resource::schema(self), from_model(name, &state)?))
    }

    fn update(&self, planned: &Map<String, Value>, prior: &Map<String, Value>) -> Result<Map<String, Value>> {
        let name = Resource::type_name(self);
        let prior: R::Model = to_model(name, prior)?;
        let state = Resource::update(self, to_model(name, planned)?, &prior)?;
        Ok(project(&Resource::schema(self), from_model(name, &state)?))
    }

    fn delete(&self, current: &Map<String, Value>) -> Result<()> {
        Resource::delete(self, &to_model(Resource::type_name(self), current)?)
    }

    fn import(&self, id: &str) -> Result<Map<String, Value>> {
        let name = Resource::type_name(self);
        let model = Resource::import(self, id)?;
        Ok(project(&Resource::schema(self), from_model(name, &model)?))
    }
}

impl<D: DataSource> DynDataSource for D {
    fn type_name(&self) -> &'static str {
        DataSource::type_name(self)
    }

    fn schema(&self) -> Schema {
        DataSource::schema(self)
    }

    fn validate(&self, config: &Map<String, Value>) -> Diagnostics {
        DataSource::schema(self).validate_config(config, &BTreeSet::new())
    }

    fn read(&self, config: &Map<String, Value>) -> Result<Map<String, Value>> {
        let name = DataSource::type_name(self);
        let state = DataSource::read(self, to_model(name, config)?)?;
        Ok(project(&DataSource::schema(self), from_model(name, &state)?))
    }
}
