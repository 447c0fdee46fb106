use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::entry::InterfaceEntry;
use crate::error::{NmfError, Result};
use crate::grid::GridBlock;
use crate::model::NeutralMap;
use crate::range::Range;
use crate::read::{BinaryFormat, FloatPrecision};
use crate::utils::{write_fortran_record, Endian};

const RULE: &str =
    "# ============================================================================================================";
const DASH: &str =
    "# ------------------------------------------------------------------------------------------------------------";

/// Write `map` as neutral map text to `path`.
pub fn write_neutral_map(path: impl AsRef<Path>, map: &NeutralMap) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path).map_err(|e| NmfError::file(path, e))?;
    let mut w = BufWriter::new(f);
    write_neutral_map_to(&mut w, map).map_err(|e| match e {
        NmfError::Io(source) => NmfError::file(path, source),
        other => other,
    })?;
    w.flush().map_err(|e| NmfError::file(path, e))?;
    debug!(path = %path.display(), blocks = map.n_blk(), entries = map.entries().len(), "neutral map written");
    Ok(())
}

/// Serialize `map` in fixed-width columns. The output parses back to an
/// equal map.
pub fn write_neutral_map_to<W: Write>(w: &mut W, map: &NeutralMap) -> Result<()> {
    writeln!(w, "# Neutral Map File")?;
    writeln!(w, "{RULE}")?;
    writeln!(w, "# Block#    IDIM    JDIM    KDIM")?;
    writeln!(w, "{DASH}")?;
    writeln!(w, "{:>8}", map.n_blk())?;
    for b in map.blocks() {
        writeln!(w, "{:>8}{:>8}{:>8}{:>8}", b.index(), b.idim(), b.jdim(), b.kdim())?;
    }

    writeln!(w, "{RULE}")?;
    writeln!(
        w,
        "# Type           B1    F1       S1    E1       S2    E2       B2    F2       S1    E1       S2    E2      Swap"
    )?;
    writeln!(w, "{DASH}")?;
    for entry in map.entries() {
        write!(w, "{:<13}", entry.kind().name())?;
        write_window(w, entry.range1())?;
        if let InterfaceEntry::Connectivity { range2, swap, .. } = entry {
            write!(w, "   ")?;
            write_window(w, range2)?;
            write!(w, "{:>10}", if *swap { "TRUE" } else { "FALSE" })?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn write_window<W: Write>(w: &mut W, r: &Range) -> Result<()> {
    write!(
        w,
        "{:>6}{:>6}{:>9}{:>6}{:>9}{:>6}",
        r.block(),
        r.face(),
        r.s1(),
        r.e1(),
        r.s2(),
        r.e2()
    )?;
    Ok(())
}

pub fn neutral_map_to_string(map: &NeutralMap) -> String {
    let mut buf = Vec::new();
    write_neutral_map_to(&mut buf, map).expect("writing into a Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write Plot3D coordinates, ASCII unless `binary`.
pub fn write_plot3d(
    path: impl AsRef<Path>,
    blocks: &[GridBlock],
    binary: bool,
    format: BinaryFormat,
    precision: FloatPrecision,
    endian: Endian,
) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path).map_err(|e| NmfError::file(path, e))?;
    let mut w = BufWriter::new(f);
    let res = if binary {
        match format {
            BinaryFormat::Raw => write_raw(&mut w, blocks, precision, endian),
            BinaryFormat::Fortran => write_fortran(&mut w, blocks, precision, endian),
        }
    } else {
        write_ascii(&mut w, blocks)
    };
    res.and_then(|_| w.flush()).map_err(|e| NmfError::file(path, e))?;
    debug!(path = %path.display(), blocks = blocks.len(), binary, "plot3d written");
    Ok(())
}

fn write_ascii(w: &mut impl Write, blocks: &[GridBlock]) -> std::io::Result<()> {
    writeln!(w, "{}", blocks.len())?;
    for b in blocks {
        writeln!(w, "{} {} {}", b.imax, b.jmax, b.kmax)?;
    }
    for b in blocks {
        write_var_ascii(w, &b.x)?;
        write_var_ascii(w, &b.y)?;
        write_var_ascii(w, &b.z)?;
    }
    Ok(())
}

fn write_var_ascii(w: &mut impl Write, v: &[f64]) -> std::io::Result<()> {
    let mut col = 0usize;
    for val in v {
        write!(w, "{:.8} ", val)?;
        col += 1;
        if col % 6 == 0 {
            writeln!(w)?;
        }
    }
    if col % 6 != 0 {
        writeln!(w)?;
    }
    Ok(())
}

fn dim_u32(n: usize) -> std::io::Result<u32> {
    u32::try_from(n).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("dimension {n} exceeds u32"))
    })
}

fn write_raw(
    w: &mut impl Write,
    blocks: &[GridBlock],
    precision: FloatPrecision,
    endian: Endian,
) -> std::io::Result<()> {
    endian.write_u32(w, dim_u32(blocks.len())?)?;
    for b in blocks {
        endian.write_u32(w, dim_u32(b.imax)?)?;
        endian.write_u32(w, dim_u32(b.jmax)?)?;
        endian.write_u32(w, dim_u32(b.kmax)?)?;
    }
    for b in blocks {
        write_values(w, &b.x, precision, endian)?;
        write_values(w, &b.y, precision, endian)?;
        write_values(w, &b.z, precision, endian)?;
    }
    Ok(())
}

fn write_fortran(
    w: &mut impl Write,
    blocks: &[GridBlock],
    precision: FloatPrecision,
    endian: Endian,
) -> std::io::Result<()> {
    let mut rec = Vec::with_capacity(4);
    endian.write_u32(&mut rec, dim_u32(blocks.len())?)?;
    write_fortran_record(w, &rec, endian)?;

    for b in blocks {
        let mut rec = Vec::with_capacity(12);
        for n in [b.imax, b.jmax, b.kmax] {
            endian.write_u32(&mut rec, dim_u32(n)?)?;
        }
        write_fortran_record(w, &rec, endian)?;
    }

    // X, Y, Z records per block
    for b in blocks {
        for v in [&b.x, &b.y, &b.z] {
            let mut rec = Vec::new();
            write_values(&mut rec, v, precision, endian)?;
            write_fortran_record(w, &rec, endian)?;
        }
    }
    Ok(())
}

fn write_values(
    w: &mut impl Write,
    v: &[f64],
    precision: FloatPrecision,
    endian: Endian,
) -> std::io::Result<()> {
    for &f in v {
        match precision {
            FloatPrecision::F32 => endian.write_f32(w, f as f32)?,
            FloatPrecision::F64 => endian.write_f64(w, f)?,
        }
    }
    Ok(())
}
