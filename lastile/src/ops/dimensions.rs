//! Removal and renaming of dimensions.

use std::path::Path;
use tracing::{info, instrument, warn};

use super::{is_coordinate, OpsError};
use crate::cloud::{Dimension, PointCloud};
use crate::codec::{PointCloudCodec, WriteOptions, BUFFER_MARK_DIMENSION};
use crate::error::TileError;

/// Removes dimensions by name. Returns the names actually removed.
///
/// Unknown names are skipped with a warning. Removing the provenance
/// dimension drops the buffer mark. Standard LAS dimensions that the output
/// point format stores are written back with their default value.
pub fn remove_dimensions(
    cloud: &mut PointCloud,
    names: &[String],
) -> Result<Vec<String>, OpsError> {
    if let Some(name) = names.iter().find(|n| is_coordinate(n)) {
        return Err(OpsError::MandatoryDimension(name.clone()));
    }

    let mut removed = Vec::with_capacity(names.len());
    for name in names {
        let found = if name == BUFFER_MARK_DIMENSION && cloud.is_buffer_marked() {
            cloud.set_buffer_marked(false);
            true
        } else {
            cloud.remove_dimension(&Dimension::from_name(name))
        };
        if found {
            removed.push(name.clone());
        } else {
            warn!(dimension = %name, "Dimension not found, nothing to remove");
        }
    }
    Ok(removed)
}

/// Renames dimensions, `old[i]` becoming `new[i]`.
///
/// Values are kept. A new name may be a standard dimension only when the
/// column already has its storage kind. Coordinates can be neither source
/// nor target, and a target must not exist yet.
pub fn rename_dimensions(
    cloud: &mut PointCloud,
    old: &[String],
    new: &[String],
) -> Result<(), OpsError> {
    if old.len() != new.len() {
        return Err(OpsError::RenameArity {
            old: old.len(),
            new: new.len(),
        });
    }

    for (from, to) in old.iter().zip(new) {
        if is_coordinate(from) {
            return Err(OpsError::MandatoryDimension(from.clone()));
        }
        if is_coordinate(to) {
            return Err(OpsError::MandatoryDimension(to.clone()));
        }

        let source = Dimension::from_name(from);
        let target = Dimension::from_name(to);
        let Some(index) = cloud.schema().index_of(&source) else {
            return Err(OpsError::UnknownDimension(from.clone()));
        };
        if cloud.schema().contains(&target) || to == BUFFER_MARK_DIMENSION {
            return Err(OpsError::DimensionExists(to.clone()));
        }

        let kind = cloud.schema().at(index).kind;
        if let Some(required) = target.native_kind() {
            if required != kind {
                return Err(OpsError::KindMismatch {
                    dimension: from.clone(),
                    target: to.clone(),
                    kind,
                    required,
                });
            }
        }
        cloud.rename_dimension_at(index, target);
    }
    Ok(())
}

/// Writes `input` without the given dimensions to `output`.
#[instrument(level = "debug", skip_all, fields(input = %input.display()))]
pub fn remove_dimensions_file<C: PointCloudCodec + ?Sized>(
    input: &Path,
    output: &Path,
    names: &[String],
    codec: &C,
    options: &WriteOptions,
) -> Result<Vec<String>, TileError> {
    let mut cloud = codec.read(input)?;
    let removed = remove_dimensions(&mut cloud, names)?;
    codec.write(&cloud, output, options)?;
    info!(output = %output.display(), removed = ?removed, "Removed dimensions");
    Ok(removed)
}

/// Writes `input` with renamed dimensions to `output`.
#[instrument(level = "debug", skip_all, fields(input = %input.display()))]
pub fn rename_dimensions_file<C: PointCloudCodec + ?Sized>(
    input: &Path,
    output: &Path,
    old: &[String],
    new: &[String],
    codec: &C,
    options: &WriteOptions,
) -> Result<(), TileError> {
    let mut cloud = codec.read(input)?;
    rename_dimensions(&mut cloud, old, new)?;
    codec.write(&cloud, output, options)?;
    info!(output = %output.display(), renamed = old.len(), "Renamed dimensions");
    Ok(())
}
