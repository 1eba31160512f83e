//! # OpenSCAD Writer
//!
//! Renders a [`Solid`] tree to OpenSCAD source text. The emission is
//! deliberately plain: one operator per line, two-space indentation, no
//! attempt at sharing subtrees. The renderer's own cache handles repeated
//! geometry far better than any dedup here could.

use std::fmt::Write;

use config::constants::EPSILON_TOLERANCE;

use crate::solid::Solid;

/// Render a solid tree as a complete OpenSCAD source file.
pub fn scad_source(solid: &Solid) -> String {
    let mut out = String::new();
    write_node(&mut out, solid, 0);
    out
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

/// Format a number the way OpenSCAD likes it: integral values without a
/// trailing fraction, everything else in shortest round-trip form.
fn num(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() < EPSILON_TOLERANCE {
        // +0 also normalizes -0.0
        format!("{}", rounded + 0.0)
    } else {
        format!("{value}")
    }
}

fn vec2(values: [f64; 2]) -> String {
    format!("[{}, {}]", num(values[0]), num(values[1]))
}

fn vec3(values: [f64; 3]) -> String {
    format!("[{}, {}, {}]", num(values[0]), num(values[1]), num(values[2]))
}

fn index_list(indices: &[usize]) -> String {
    let items: Vec<String> = indices.iter().map(usize::to_string).collect();
    format!("[{}]", items.join(", "))
}

fn write_block(out: &mut String, head: &str, children: &[Solid], level: usize) {
    indent(out, level);
    out.push_str(head);
    out.push_str(" {\n");
    for child in children {
        write_node(out, child, level + 1);
    }
    indent(out, level);
    out.push_str("}\n");
}

fn write_wrapper(out: &mut String, head: &str, child: &Solid, level: usize) {
    indent(out, level);
    out.push_str(head);
    out.push_str("\n");
    write_node(out, child, level + 1);
}

fn write_node(out: &mut String, solid: &Solid, level: usize) {
    match solid {
        Solid::Cube { size, center } => {
            indent(out, level);
            let _ = writeln!(out, "cube({}, center={center});", vec3(*size));
        }
        Solid::Sphere { radius, segments } => {
            indent(out, level);
            let _ = writeln!(out, "sphere(r={}, $fn={segments});", num(*radius));
        }
        Solid::Cylinder {
            height,
            radius1,
            radius2,
            center,
            segments,
        } => {
            indent(out, level);
            let _ = writeln!(
                out,
                "cylinder(h={}, r1={}, r2={}, center={center}, $fn={segments});",
                num(*height),
                num(*radius1),
                num(*radius2)
            );
        }
        Solid::Polygon { points, paths } => {
            indent(out, level);
            let point_items: Vec<String> = points.iter().map(|p| vec2(*p)).collect();
            match paths {
                Some(paths) => {
                    let path_items: Vec<String> =
                        paths.iter().map(|path| index_list(path)).collect();
                    let _ = writeln!(
                        out,
                        "polygon(points=[{}], paths=[{}]);",
                        point_items.join(", "),
                        path_items.join(", ")
                    );
                }
                None => {
                    let _ = writeln!(out, "polygon(points=[{}]);", point_items.join(", "));
                }
            }
        }
        Solid::Polyhedron { points, faces } => {
            indent(out, level);
            let point_items: Vec<String> = points.iter().map(|p| vec3(*p)).collect();
            let face_items: Vec<String> = faces.iter().map(|face| index_list(face)).collect();
            let _ = writeln!(
                out,
                "polyhedron(points=[{}], faces=[{}]);",
                point_items.join(", "),
                face_items.join(", ")
            );
        }
        Solid::Translate { offset, child } => {
            write_wrapper(out, &format!("translate({})", vec3(*offset)), child, level);
        }
        Solid::Rotate { angles, child } => {
            write_wrapper(out, &format!("rotate({})", vec3(*angles)), child, level);
        }
        Solid::Scale { factors, child } => {
            write_wrapper(out, &format!("scale({})", vec3(*factors)), child, level);
        }
        Solid::Mirror { normal, child } => {
            write_wrapper(out, &format!("mirror({})", vec3(*normal)), child, level);
        }
        Solid::Multmatrix { matrix, child } => {
            let rows: Vec<String> = matrix
                .iter()
                .map(|row| {
                    format!(
                        "[{}, {}, {}, {}]",
                        num(row[0]),
                        num(row[1]),
                        num(row[2]),
                        num(row[3])
                    )
                })
                .collect();
            write_wrapper(
                out,
                &format!("multmatrix([{}])", rows.join(", ")),
                child,
                level,
            );
        }
        Solid::Union { children } => write_block(out, "union()", children, level),
        Solid::Difference { children } => write_block(out, "difference()", children, level),
        Solid::Intersection { children } => write_block(out, "intersection()", children, level),
        Solid::Hull { children } => write_block(out, "hull()", children, level),
        Solid::Minkowski { children } => write_block(out, "minkowski()", children, level),
        Solid::LinearExtrude {
            height,
            twist,
            scale,
            center,
            child,
        } => {
            write_wrapper(
                out,
                &format!(
                    "linear_extrude(height={}, twist={}, scale={}, center={center})",
                    num(*height),
                    num(*twist),
                    vec2(*scale)
                ),
                child,
                level,
            );
        }
        Solid::RotateExtrude {
            angle,
            segments,
            child,
        } => {
            write_wrapper(
                out,
                &format!("rotate_extrude(angle={}, $fn={segments})", num(*angle)),
                child,
                level,
            );
        }
        Solid::Offset {
            delta,
            chamfer,
            child,
        } => {
            write_wrapper(
                out,
                &format!("offset(delta={}, chamfer={chamfer})", num(*delta)),
                child,
                level,
            );
        }
        Solid::Projection { cut, child } => {
            write_wrapper(out, &format!("projection(cut={cut})"), child, level);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
