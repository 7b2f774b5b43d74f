//! Whitelist-based response shaping.
//!
//! A [`ProjectionSpec`] is built once at startup for each external output
//! shape and applied by the boundary layer after a handler returns. Only the
//! declared fields ever reach a response body; anything else on the source
//! object, including columns added later, is dropped.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("projection '{spec}' failed on field '{field}': {source}")]
    Field {
        spec: &'static str,
        field: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

type Accessor<S> = Arc<dyn Fn(&S) -> Result<Value, anyhow::Error> + Send + Sync>;

struct ProjectedField<S> {
    output: &'static str,
    read: Accessor<S>,
}

impl<S> Clone for ProjectedField<S> {
    fn clone(&self) -> Self {
        Self {
            output: self.output,
            read: Arc::clone(&self.read),
        }
    }
}

/// A named, ordered whitelist of output fields for one external shape.
///
/// Each field is computed from the full source object, so an accessor may
/// flatten nested state (a related record's id, say) into a top-level field.
pub struct ProjectionSpec<S> {
    name: &'static str,
    fields: Vec<ProjectedField<S>>,
}

impl<S> Clone for ProjectionSpec<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            fields: self.fields.clone(),
        }
    }
}

impl<S> ProjectionSpec<S> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declare an output field computed by an infallible accessor.
    pub fn expose<T, F>(self, output: &'static str, read: F) -> Self
    where
        T: Serialize,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        self.expose_with(output, move |source| Ok(read(source)))
    }

    /// Declare an output field computed by a fallible transform. A transform
    /// failure aborts the whole projection; there is no partial output.
    pub fn expose_with<T, F>(mut self, output: &'static str, read: F) -> Self
    where
        T: Serialize,
        F: Fn(&S) -> Result<T, anyhow::Error> + Send + Sync + 'static,
    {
        self.fields.push(ProjectedField {
            output,
            read: Arc::new(move |source| {
                read(source).and_then(|value| serde_json::to_value(value).map_err(anyhow::Error::from))
            }),
        });
        self
    }

    /// Project a source object into its external shape. The source is never
    /// mutated; the output contains exactly the declared fields.
    pub fn project(&self, source: &S) -> Result<Value, ProjectionError> {
        let mut out = Map::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = (field.read)(source).map_err(|source| ProjectionError::Field {
                spec: self.name,
                field: field.output,
                source,
            })?;
            out.insert(field.output.to_string(), value);
        }
        Ok(Value::Object(out))
    }

    /// Project a slice of source objects into a JSON array.
    pub fn project_all(&self, sources: &[S]) -> Result<Value, ProjectionError> {
        let items = sources
            .iter()
            .map(|source| self.project(source))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Array(items))
    }
}
