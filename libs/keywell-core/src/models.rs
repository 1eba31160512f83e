//! # Output Model Registry
//!
//! Builds the set of named scene graphs one parameter document yields:
//! the right and left case halves and, when included, their bottom
//! plates. The left-hand models are mirrors of the right, so a single
//! plan derivation serves all of them.

use config::Params;
use glam::DVec3;
use keywell_scad::Solid;
use log::info;

use crate::body;
use crate::error::Result;
use crate::plan::KeyboardPlan;

/// One named output model.
#[derive(Debug, Clone)]
pub struct Model {
    /// Stable model name, used for output file stems.
    pub name: String,
    /// The model's scene graph.
    pub solid: Solid,
}

impl Model {
    fn new(name: &str, solid: Solid) -> Self {
        Self {
            name: name.to_string(),
            solid,
        }
    }

    /// The same model mirrored across the x = 0 plane.
    fn mirrored(&self, name: &str) -> Self {
        Self::new(name, Solid::mirror(DVec3::new(1.0, 0.0, 0.0), self.solid.clone()))
    }
}

/// Build every model the document asks for.
pub fn build_models(params: Params) -> Result<Vec<Model>> {
    let with_plate = body::bottom_plate_included(&params)?;
    let with_preview = params.get_bool(&["case", "preview", "include"])?;
    let plan = KeyboardPlan::new(params)?;
    let case = body::case_body(&plan)?;

    let right = Model::new("case-right", case.clone());
    let left = right.mirrored("case-left");
    let mut models = vec![right, left];

    if with_plate {
        let plate = Model::new("bottom-plate-right", body::bottom_plate(&plan)?);
        let plate_left = plate.mirrored("bottom-plate-left");
        models.push(plate);
        models.push(plate_left);
    }
    if with_preview {
        models.push(Model::new(
            "preview-right",
            body::preview_body(&plan, &case)?,
        ));
    }
    info!(
        "built {} model(s): {}",
        models.len(),
        models
            .iter()
            .map(|m| m.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(models)
}

// =============================================================================
// TESTS
// =============================================================================
