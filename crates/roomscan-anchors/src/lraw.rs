//! LRAW recordings: captured mesh-anchor streams in a little-endian container.
//!
//! Layout:
//! - 32-byte header: `b"LRAW"`, version `u16`, flags `u16`, mesh/texture/depth
//!   record counts as `u32`, 12 reserved bytes
//! - `mesh_count` anchor records: 16-byte UUID, 16 `f32` column-major
//!   transform, vertex count `u32`, face count `u32`, classification flag `u8`,
//!   xyz vertices, xyz normals, `u32` index triples, optional per-vertex tags
//! - texture and depth frames (not decoded here)

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use roomscan_geometry::Classification;
use roomscan_math::{Point3, Transform, Vec3};
use tracing::{debug, info};

use crate::error::{LrawError, Result};
use crate::patch::{Patch, PatchId};
use crate::store::PatchEvent;

/// Magic bytes at the start of every recording.
pub const LRAW_MAGIC: [u8; 4] = *b"LRAW";

/// Container version written by [`write_lraw`].
pub const LRAW_VERSION: u16 = 1;

const HEADER_SIZE: usize = 32;

/// Upper bound on per-anchor vertex and face counts.
const MAX_ELEMENTS: u32 = 16 * 1024 * 1024;

/// Header flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LrawFlags(pub u16);

impl LrawFlags {
    /// Anchors may carry per-vertex classifications.
    pub const HAS_CLASSIFICATIONS: LrawFlags = LrawFlags(1 << 0);
    /// Depth frames carry confidence maps.
    pub const HAS_CONFIDENCE_MAPS: LrawFlags = LrawFlags(1 << 1);
    /// Texture frames follow the anchors.
    pub const HAS_TEXTURE_FRAMES: LrawFlags = LrawFlags(1 << 2);
    /// Depth frames follow the texture frames.
    pub const HAS_DEPTH_FRAMES: LrawFlags = LrawFlags(1 << 3);
    /// Payload is compressed.
    pub const COMPRESSED: LrawFlags = LrawFlags(1 << 4);

    /// True when every bit of `other` is set.
    pub fn contains(self, other: LrawFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for LrawFlags {
    type Output = LrawFlags;

    fn bitor(self, rhs: LrawFlags) -> LrawFlags {
        LrawFlags(self.0 | rhs.0)
    }
}

/// The decoded mesh-anchor section of a recording.
#[derive(Debug, Clone)]
pub struct Recording {
    /// Container version.
    pub version: u16,
    /// Header flags.
    pub flags: LrawFlags,
    /// Anchors in file order.
    pub anchors: Vec<Patch>,
    /// Number of texture frames after the anchors (not decoded).
    pub texture_count: u32,
    /// Number of depth frames after the textures (not decoded).
    pub depth_count: u32,
}

impl Recording {
    /// Sum of anchor vertex counts.
    pub fn total_vertices(&self) -> usize {
        self.anchors.iter().map(Patch::vertex_count).sum()
    }

    /// Sum of anchor face counts.
    pub fn total_faces(&self) -> usize {
        self.anchors.iter().map(|a| a.faces.len()).sum()
    }

    /// Replay the anchors as upserts, in file order.
    pub fn events(&self) -> impl Iterator<Item = PatchEvent> + '_ {
        self.anchors.iter().cloned().map(PatchEvent::Upsert)
    }

    /// Consume the recording into upserts, in file order.
    pub fn into_events(self) -> impl Iterator<Item = PatchEvent> {
        self.anchors.into_iter().map(PatchEvent::Upsert)
    }
}

/// Open and decode a recording file.
pub fn read_lraw_file(path: impl AsRef<Path>) -> Result<Recording> {
    let file = File::open(path.as_ref())?;
    read_lraw(BufReader::new(file))
}

/// Decode the header and mesh-anchor section from `reader`.
pub fn read_lraw<R: Read>(mut reader: R) -> Result<Recording> {
    let mut header = [0u8; HEADER_SIZE];
    read_section(&mut reader, &mut header, "header", 0)?;

    let magic = [header[0], header[1], header[2], header[3]];
    if magic != LRAW_MAGIC {
        return Err(LrawError::InvalidMagic(magic));
    }

    let version = u16::from_le_bytes([header[4], header[5]]);
    let flags = LrawFlags(u16::from_le_bytes([header[6], header[7]]));
    let mesh_count = le_u32(&header[8..12]);
    let texture_count = le_u32(&header[12..16]);
    let depth_count = le_u32(&header[16..20]);

    debug!(
        version,
        flags = flags.0,
        mesh_count,
        texture_count,
        depth_count,
        "LRAW header"
    );

    if flags.contains(LrawFlags::COMPRESSED) {
        return Err(LrawError::Compressed);
    }

    let tagged = flags.contains(LrawFlags::HAS_CLASSIFICATIONS);
    let mut anchors = Vec::new();
    for index in 0..mesh_count as usize {
        anchors.push(read_anchor(&mut reader, index, tagged)?);
    }

    let recording = Recording {
        version,
        flags,
        anchors,
        texture_count,
        depth_count,
    };
    info!(
        anchors = recording.anchors.len(),
        vertices = recording.total_vertices(),
        faces = recording.total_faces(),
        "decoded LRAW recording"
    );
    Ok(recording)
}

fn read_anchor<R: Read>(reader: &mut R, index: usize, tagged: bool) -> Result<Patch> {
    let mut uuid = [0u8; 16];
    read_section(reader, &mut uuid, "anchor id", index)?;

    let mut matrix = [0u8; 64];
    read_section(reader, &mut matrix, "anchor transform", index)?;
    let mut columns = [0f32; 16];
    for (value, bytes) in columns.iter_mut().zip(matrix.chunks_exact(4)) {
        *value = le_f32(bytes);
    }

    let mut counts = [0u8; 9];
    read_section(reader, &mut counts, "anchor counts", index)?;
    let vertex_count = checked_count(le_u32(&counts[0..4]), "vertices", index)?;
    let face_count = checked_count(le_u32(&counts[4..8]), "faces", index)?;
    let has_class = counts[8] != 0;

    let vertices = read_vec3s(reader, vertex_count, "vertices", index)?
        .into_iter()
        .map(Point3::from)
        .collect();
    let normals = read_vec3s(reader, vertex_count, "normals", index)?;

    let mut face_bytes = vec![0u8; face_count * 12];
    read_section(reader, &mut face_bytes, "faces", index)?;
    let faces = face_bytes
        .chunks_exact(12)
        .map(|c| [le_u32(&c[0..4]), le_u32(&c[4..8]), le_u32(&c[8..12])])
        .collect();

    let mut patch = Patch::new(PatchId::from_bytes(uuid), vertices, normals, faces)
        .with_transform(Transform::from_column_major(&columns));

    if has_class && tagged {
        let mut tags = vec![0u8; vertex_count];
        read_section(reader, &mut tags, "classifications", index)?;
        patch = patch.with_classifications(tags.into_iter().map(Classification::from_code).collect());
    }

    Ok(patch)
}

fn read_vec3s<R: Read>(
    reader: &mut R,
    count: usize,
    section: &'static str,
    index: usize,
) -> Result<Vec<Vec3>> {
    let mut bytes = vec![0u8; count * 12];
    read_section(reader, &mut bytes, section, index)?;
    Ok(bytes
        .chunks_exact(12)
        .map(|c| Vec3::new(le_f32(&c[0..4]), le_f32(&c[4..8]), le_f32(&c[8..12])))
        .collect())
}

fn read_section<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    section: &'static str,
    index: usize,
) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => LrawError::Truncated { section, index },
        _ => LrawError::Io(e),
    })
}

fn checked_count(count: u32, what: &'static str, index: usize) -> Result<usize> {
    if count > MAX_ELEMENTS {
        return Err(LrawError::Oversized {
            index,
            what,
            count,
            limit: MAX_ELEMENTS,
        });
    }
    Ok(count as usize)
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn le_f32(bytes: &[u8]) -> f32 {
    f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Write `patches` as a recording file.
pub fn write_lraw_file(path: impl AsRef<Path>, patches: &[Patch], flags: LrawFlags) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_lraw(&mut writer, patches, flags)?;
    writer.flush()?;
    Ok(())
}

/// Encode `patches` as the header plus mesh-anchor section.
///
/// Texture and depth counts are written as zero. Classifications are stored
/// only when `flags` has [`LrawFlags::HAS_CLASSIFICATIONS`] and the patch has
/// exactly one tag per vertex.
pub fn write_lraw<W: Write>(writer: &mut W, patches: &[Patch], flags: LrawFlags) -> Result<()> {
    if flags.contains(LrawFlags::COMPRESSED) {
        return Err(LrawError::Compressed);
    }
    let flags = LrawFlags(
        flags.0 & !(LrawFlags::HAS_TEXTURE_FRAMES.0 | LrawFlags::HAS_DEPTH_FRAMES.0),
    );

    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&LRAW_MAGIC);
    header[4..6].copy_from_slice(&LRAW_VERSION.to_le_bytes());
    header[6..8].copy_from_slice(&flags.0.to_le_bytes());
    header[8..12].copy_from_slice(&(patches.len() as u32).to_le_bytes());
    writer.write_all(&header)?;

    let tagged = flags.contains(LrawFlags::HAS_CLASSIFICATIONS);
    for patch in patches {
        writer.write_all(patch.id.as_bytes())?;
        for value in patch.transform.to_column_major() {
            writer.write_all(&value.to_le_bytes())?;
        }

        let tags = patch
            .classifications
            .as_ref()
            .filter(|t| tagged && t.len() == patch.vertex_count());

        writer.write_all(&(patch.vertex_count() as u32).to_le_bytes())?;
        writer.write_all(&(patch.faces.len() as u32).to_le_bytes())?;
        writer.write_all(&[u8::from(tags.is_some())])?;

        for v in &patch.vertices {
            write_xyz(writer, v.x, v.y, v.z)?;
        }
        // Keep the normal block the same length as the vertex block.
        for i in 0..patch.vertex_count() {
            let n = patch.normals.get(i).copied().unwrap_or_else(Vec3::zeros);
            write_xyz(writer, n.x, n.y, n.z)?;
        }
        for f in &patch.faces {
            for i in f {
                writer.write_all(&i.to_le_bytes())?;
            }
        }
        if let Some(tags) = tags {
            let codes: Vec<u8> = tags.iter().map(|t| t.code()).collect();
            writer.write_all(&codes)?;
        }
    }
    Ok(())
}

fn write_xyz<W: Write>(writer: &mut W, x: f32, y: f32, z: f32) -> Result<()> {
    writer.write_all(&x.to_le_bytes())?;
    writer.write_all(&y.to_le_bytes())?;
    writer.write_all(&z.to_le_bytes())?;
    Ok(())
}
