//! Wavefront OBJ output for inspecting generated fish in a modeling tool.

use anyhow::{Context, Result};
use fish_procgen::FishMesh;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write `mesh` as OBJ: `v x y z r g b` (vertex colors as the common extension),
/// smooth `vn` normals, and 1-based `f v//vn` faces, one group per part.
pub fn write_obj<W: Write>(mesh: &FishMesh, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "# fishgen: {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count())?;
    for (p, c) in mesh.positions().iter().zip(mesh.colors()) {
        writeln!(out, "v {} {} {} {} {} {}", p.x, p.y, p.z, c.x, c.y, c.z)?;
    }
    for n in mesh.normals() {
        writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    for part in &mesh.parts {
        writeln!(out, "g {:?}", part.part)?;
        let tris = &mesh.indices()[part.indices.start as usize..part.indices.end as usize];
        for tri in tris.chunks_exact(3) {
            let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
            writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
        }
    }
    Ok(())
}

pub fn write_obj_file(mesh: &FishMesh, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    let mut out = BufWriter::new(file);
    write_obj(mesh, &mut out).with_context(|| format!("writing {:?}", path))?;
    out.flush().with_context(|| format!("flushing {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fish_procgen::{FishGenerator, FishParams};

    #[test]
    fn obj_lists_every_vertex_and_face() {
        let mesh = FishGenerator::new(FishParams::default()).generate().unwrap();
        let mut buf = Vec::new();
        write_obj(&mesh, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), mesh.vertex_count());
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), mesh.vertex_count());
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), mesh.triangle_count());
        assert_eq!(text.lines().filter(|l| l.starts_with("g ")).count(), mesh.parts.len());
        assert!(text.contains("g Torso"));
    }

    #[test]
    fn faces_are_one_based() {
        let mesh = FishGenerator::new(FishParams::default()).generate().unwrap();
        let mut buf = Vec::new();
        write_obj(&mesh, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let max = mesh.vertex_count() as u32;
        for line in text.lines().filter(|l| l.starts_with("f ")) {
            for corner in line[2..].split_whitespace() {
                let v: u32 = corner.split("//").next().unwrap().parse().unwrap();
                assert!(v >= 1 && v <= max, "{}", line);
            }
        }
    }
}
