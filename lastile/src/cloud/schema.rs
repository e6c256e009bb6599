//! Ordered attribute schema of a point cloud.

use thiserror::Error;

use super::dimension::{Dimension, Value, ValueKind};

/// Two inputs define the same dimension with different storage types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dimension '{dimension}' is {existing} in one input and {incoming} in another")]
pub struct SchemaConflictError {
    pub dimension: String,
    pub existing: ValueKind,
    pub incoming: ValueKind,
}

/// Definition of one attribute column.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionDef {
    pub dimension: Dimension,
    pub kind: ValueKind,
    pub default: Value,
}

impl DimensionDef {
    /// Definition with the documented default of the dimension.
    pub fn new(dimension: Dimension, kind: ValueKind) -> Self {
        let default = dimension.default_value(kind);
        Self {
            dimension,
            kind,
            default,
        }
    }

    /// Definition of a known dimension with its LAS storage type.
    ///
    /// Extra dimensions have no native kind and are stored as doubles.
    pub fn native(dimension: Dimension) -> Self {
        let kind = dimension.native_kind().unwrap_or(ValueKind::F64);
        Self::new(dimension, kind)
    }
}

/// Ordered list of attribute definitions.
///
/// Point values are stored in the same order as the schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    dims: Vec<DimensionDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema of known dimensions with their native kinds.
    pub fn native(dimensions: &[Dimension]) -> Self {
        Self {
            dims: dimensions.iter().cloned().map(DimensionDef::native).collect(),
        }
    }

    /// Appends a definition.
    ///
    /// Adding a dimension that already exists with the same kind is a no-op;
    /// with another kind it is a conflict. Returns the column index.
    pub fn push(&mut self, def: DimensionDef) -> Result<usize, SchemaConflictError> {
        if let Some(index) = self.index_of(&def.dimension) {
            let existing = self.dims[index].kind;
            if existing != def.kind {
                return Err(SchemaConflictError {
                    dimension: def.dimension.name().to_string(),
                    existing,
                    incoming: def.kind,
                });
            }
            return Ok(index);
        }
        self.dims.push(def);
        Ok(self.dims.len() - 1)
    }

    /// Union of two schemas, keeping the order of `self` then the new
    /// dimensions of `other`.
    pub fn union(&self, other: &Schema) -> Result<Schema, SchemaConflictError> {
        let mut merged = self.clone();
        for def in &other.dims {
            merged.push(def.clone())?;
        }
        Ok(merged)
    }

    pub fn index_of(&self, dimension: &Dimension) -> Option<usize> {
        self.dims.iter().position(|d| &d.dimension == dimension)
    }

    pub fn get(&self, dimension: &Dimension) -> Option<&DimensionDef> {
        self.dims.iter().find(|d| &d.dimension == dimension)
    }

    /// Definition of the column at `index`.
    ///
    /// Panics when `index` is out of bounds.
    pub fn at(&self, index: usize) -> &DimensionDef {
        &self.dims[index]
    }

    pub fn contains(&self, dimension: &Dimension) -> bool {
        self.index_of(dimension).is_some()
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DimensionDef> {
        self.dims.iter()
    }

    /// Extra (non-LAS) dimensions, in schema order.
    pub fn extras(&self) -> impl Iterator<Item = &DimensionDef> {
        self.dims.iter().filter(|d| d.dimension.is_extra())
    }

    /// Appends a definition the caller knows to be absent.
    pub(crate) fn append(&mut self, def: DimensionDef) {
        debug_assert!(!self.contains(&def.dimension));
        self.dims.push(def);
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> DimensionDef {
        self.dims.remove(index)
    }

    pub(crate) fn rename_at(&mut self, index: usize, dimension: Dimension) {
        self.dims[index].dimension = dimension;
    }

    /// Default values of every column.
    pub fn defaults(&self) -> Vec<Value> {
        self.dims.iter().map(|d| d.default).collect()
    }
}
