//! # Scene-Graph Solids
//!
//! The CSG tree produced by the generator. All values are fully resolved
//! numbers; there are no variables or deferred expressions. The node
//! inventory matches the operator set the external renderer is contracted
//! to provide: primitives, booleans, hull, rigid transforms, extrusions,
//! and the 2D offset/projection pair.

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

// =============================================================================
// SOLID
// =============================================================================

/// A node in the generated CSG tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Solid {
    // =========================================================================
    // PRIMITIVES
    // =========================================================================
    /// Rectangular prism.
    Cube {
        /// Size as [x, y, z].
        size: [f64; 3],
        /// Whether centered at the origin.
        center: bool,
    },

    /// Sphere.
    Sphere {
        /// Radius.
        radius: f64,
        /// Tessellation segment count.
        segments: u32,
    },

    /// Cylinder or cone frustum.
    Cylinder {
        /// Height.
        height: f64,
        /// Bottom radius.
        radius1: f64,
        /// Top radius.
        radius2: f64,
        /// Whether centered on z.
        center: bool,
        /// Tessellation segment count.
        segments: u32,
    },

    /// 2D polygon.
    Polygon {
        /// Vertex positions.
        points: Vec<[f64; 2]>,
        /// Optional explicit paths into `points`.
        paths: Option<Vec<Vec<usize>>>,
    },

    /// Polyhedron with explicit face-vertex lists.
    Polyhedron {
        /// Vertex positions.
        points: Vec<[f64; 3]>,
        /// Face indices, outward-facing when wound clockwise.
        faces: Vec<Vec<usize>>,
    },

    // =========================================================================
    // TRANSFORMS
    // =========================================================================
    /// Translation.
    Translate {
        /// Offset as [x, y, z].
        offset: [f64; 3],
        /// Child solid.
        child: Box<Solid>,
    },

    /// Euler rotation, angles in degrees (renderer convention).
    Rotate {
        /// Rotation angles [x, y, z] in degrees.
        angles: [f64; 3],
        /// Child solid.
        child: Box<Solid>,
    },

    /// Non-uniform scale.
    Scale {
        /// Scale factors [x, y, z].
        factors: [f64; 3],
        /// Child solid.
        child: Box<Solid>,
    },

    /// Mirror across the plane with the given normal.
    Mirror {
        /// Mirror plane normal.
        normal: [f64; 3],
        /// Child solid.
        child: Box<Solid>,
    },

    /// General affine transform, row-major 4×4.
    Multmatrix {
        /// Row-major transform matrix.
        matrix: [[f64; 4]; 4],
        /// Child solid.
        child: Box<Solid>,
    },

    // =========================================================================
    // BOOLEANS
    // =========================================================================
    /// Union of children.
    Union {
        /// Child solids.
        children: Vec<Solid>,
    },

    /// First child minus the rest.
    Difference {
        /// Child solids.
        children: Vec<Solid>,
    },

    /// Intersection of children.
    Intersection {
        /// Child solids.
        children: Vec<Solid>,
    },

    /// Convex hull of children.
    ///
    /// Hulls of fewer than three distinct anchors are legal and may come
    /// out degenerate; the web builder relies on the renderer accepting
    /// them.
    Hull {
        /// Child solids.
        children: Vec<Solid>,
    },

    /// Minkowski sum of children.
    Minkowski {
        /// Child solids.
        children: Vec<Solid>,
    },

    // =========================================================================
    // EXTRUSIONS AND 2D OPERATIONS
    // =========================================================================
    /// Linear extrusion of a 2D child.
    LinearExtrude {
        /// Extrusion height.
        height: f64,
        /// Twist angle in degrees.
        twist: f64,
        /// Scale at the top as [x, y].
        scale: [f64; 2],
        /// Whether centered on z.
        center: bool,
        /// Child 2D solid.
        child: Box<Solid>,
    },

    /// Rotational extrusion of a 2D child.
    RotateExtrude {
        /// Sweep angle in degrees.
        angle: f64,
        /// Tessellation segment count.
        segments: u32,
        /// Child 2D solid.
        child: Box<Solid>,
    },

    /// 2D offset (expand/shrink).
    Offset {
        /// Offset amount; positive expands.
        delta: f64,
        /// Chamfered rather than round joins.
        chamfer: bool,
        /// Child 2D solid.
        child: Box<Solid>,
    },

    /// Projection of a 3D child onto the z = 0 plane.
    Projection {
        /// Only take the cross-section at z = 0.
        cut: bool,
        /// Child 3D solid.
        child: Box<Solid>,
    },
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

impl Solid {
    /// Centered cube.
    pub fn cube(size: DVec3) -> Self {
        Self::Cube {
            size: size.to_array(),
            center: true,
        }
    }

    /// Union, flattening the no-op single-child case.
    pub fn union(mut children: Vec<Solid>) -> Self {
        if children.len() == 1 {
            return children.pop().unwrap_or(Self::Union { children: vec![] });
        }
        Self::Union { children }
    }

    /// Difference of `minuend` and `subtrahends`.
    pub fn difference(minuend: Solid, subtrahends: Vec<Solid>) -> Self {
        let mut children = Vec::with_capacity(subtrahends.len() + 1);
        children.push(minuend);
        children.extend(subtrahends);
        Self::Difference { children }
    }

    /// Convex hull of children.
    pub fn hull(children: Vec<Solid>) -> Self {
        Self::Hull { children }
    }

    /// Translation by a vector.
    pub fn translate(offset: DVec3, child: Solid) -> Self {
        Self::Translate {
            offset: offset.to_array(),
            child: Box::new(child),
        }
    }

    /// Mirror across the plane with the given normal.
    pub fn mirror(normal: DVec3, child: Solid) -> Self {
        Self::Mirror {
            normal: normal.to_array(),
            child: Box::new(child),
        }
    }

    /// General transform from a glam matrix.
    ///
    /// glam stores columns; the scene graph (and the renderer) want rows.
    pub fn transformed(matrix: DMat4, child: Solid) -> Self {
        let m = matrix.to_cols_array_2d();
        let rows = [
            [m[0][0], m[1][0], m[2][0], m[3][0]],
            [m[0][1], m[1][1], m[2][1], m[3][1]],
            [m[0][2], m[1][2], m[2][2], m[3][2]],
            [m[0][3], m[1][3], m[2][3], m[3][3]],
        ];
        Self::Multmatrix {
            matrix: rows,
            child: Box::new(child),
        }
    }

    /// Extrude a 2D child straight up.
    pub fn extrude(height: f64, child: Solid) -> Self {
        Self::LinearExtrude {
            height,
            twist: 0.0,
            scale: [1.0, 1.0],
            center: false,
            child: Box::new(child),
        }
    }

    /// Flat projection of a 3D child.
    pub fn projection(child: Solid) -> Self {
        Self::Projection {
            cut: false,
            child: Box::new(child),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_of_one_flattens() {
        let cube = Solid::cube(DVec3::splat(1.0));
        assert_eq!(Solid::union(vec![cube.clone()]), cube);
    }

    #[test]
    fn test_transformed_transposes_to_rows() {
        let matrix = DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0));
        let node = Solid::transformed(matrix, Solid::cube(DVec3::ONE));
        match node {
            Solid::Multmatrix { matrix, .. } => {
                // Translation lands in the last column of each row.
                assert_eq!(matrix[0][3], 1.0);
                assert_eq!(matrix[1][3], 2.0);
                assert_eq!(matrix[2][3], 3.0);
                assert_eq!(matrix[3], [0.0, 0.0, 0.0, 1.0]);
            }
            other => panic!("expected Multmatrix, got {other:?}"),
        }
    }

    #[test]
    fn test_tree_round_trips_through_serde() {
        let tree = Solid::difference(
            Solid::cube(DVec3::splat(10.0)),
            vec![Solid::translate(
                DVec3::new(0.0, 0.0, 2.0),
                Solid::Sphere {
                    radius: 3.0,
                    segments: 32,
                },
            )],
        );
        let text = serde_json::to_string(&tree).unwrap();
        let back: Solid = serde_json::from_str(&text).unwrap();
        assert_eq!(tree, back);
    }
}
