use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::bc::BoundaryCondition;
use crate::block::StructuredBlock;
use crate::entry::InterfaceEntry;
use crate::error::{NmfError, Result};
use crate::grid::{point_count, GridBlock};
use crate::model::NeutralMap;
use crate::range::Range;
use crate::utils::{read_fortran_record, Endian};

/// Parser settings for neutral map text.
#[derive(Copy, Clone, Debug)]
pub struct ReadOptions {
    /// Lines whose first non-blank character is this are skipped.
    pub comment: char,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { comment: '#' }
    }
}

/// Upper bound on up-front allocation driven by counts read from a file.
/// Larger payloads grow as they are actually read.
const PREALLOC_LIMIT: usize = 1 << 16;

#[derive(Copy, Clone, Debug)]
pub enum BinaryFormat {
    Fortran,
    Raw,
}

#[derive(Copy, Clone, Debug)]
pub enum FloatPrecision {
    F32,
    F64,
}

/// Read a neutral map file with default options.
pub fn read_neutral_map(path: impl AsRef<Path>) -> Result<NeutralMap> {
    read_neutral_map_with(path, &ReadOptions::default())
}

pub fn read_neutral_map_with(path: impl AsRef<Path>, options: &ReadOptions) -> Result<NeutralMap> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| NmfError::file(path, e))?;
    let map = parse_neutral_map_with(&text, options)?;
    debug!(path = %path.display(), blocks = map.n_blk(), entries = map.entries().len(), "neutral map read");
    Ok(map)
}

pub fn parse_neutral_map(text: &str) -> Result<NeutralMap> {
    parse_neutral_map_with(text, &ReadOptions::default())
}

/// Parse neutral map text.
///
/// Layout: block count, one `index I J K` line per block, then one entry per
/// line. Comment and blank lines may appear anywhere. Errors carry the
/// 1-based line number.
pub fn parse_neutral_map_with(text: &str, options: &ReadOptions) -> Result<NeutralMap> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(n, l)| (n + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with(options.comment));

    let (line, head) = lines
        .next()
        .ok_or_else(|| NmfError::format(0, "missing block count"))?;
    let mut tokens = head.split_whitespace();
    let nblocks = next_usize(&mut tokens, line, "block count")?;
    expect_end(&mut tokens, line)?;
    if nblocks == 0 {
        return Err(NmfError::format(line, "block count must be at least 1"));
    }

    let mut map = NeutralMap::new();
    for position in 1..=nblocks {
        let (line, text) = lines.next().ok_or_else(|| {
            NmfError::format(line, format!("expected {nblocks} block lines, found {}", position - 1))
        })?;
        let mut tokens = text.split_whitespace();
        let index = next_usize(&mut tokens, line, "block index")?;
        let ni = next_usize(&mut tokens, line, "I dimension")?;
        let nj = next_usize(&mut tokens, line, "J dimension")?;
        let nk = next_usize(&mut tokens, line, "K dimension")?;
        expect_end(&mut tokens, line)?;
        if index != position {
            return Err(NmfError::format(
                line,
                format!("block {index} declared in position {position}"),
            ));
        }
        map.add_block(StructuredBlock::from_dims(ni, nj, nk)?)?;
    }

    let mut count = 0;
    for (line, text) in lines {
        let mut tokens = text.split_whitespace();
        let name = tokens
            .next()
            .ok_or_else(|| NmfError::format(line, "missing boundary condition"))?;
        let kind = BoundaryCondition::from_name(name)?;
        let range1 = Range::from_fields(next_fields(&mut tokens, line)?)?;
        let entry = if kind.is_connectivity() {
            let range2 = Range::from_fields(next_fields(&mut tokens, line)?)?;
            let swap = match tokens.next().map(str::to_ascii_uppercase).as_deref() {
                Some("TRUE") => true,
                Some("FALSE") => false,
                Some(other) => {
                    return Err(NmfError::format(line, format!("swap flag must be TRUE or FALSE, got \"{other}\"")))
                }
                None => return Err(NmfError::format(line, "missing swap flag")),
            };
            InterfaceEntry::connectivity(range1, range2, swap)?
        } else {
            InterfaceEntry::boundary(kind, range1)?
        };
        expect_end(&mut tokens, line)?;
        map.add_entry(entry)?;
        count += 1;
    }
    if count == 0 {
        return Err(NmfError::format(text.lines().count(), "no boundary or interface entries"));
    }
    Ok(map)
}

fn next_usize<'a>(tokens: &mut impl Iterator<Item = &'a str>, line: usize, what: &str) -> Result<usize> {
    let tok = tokens
        .next()
        .ok_or_else(|| NmfError::format(line, format!("missing {what}")))?;
    tok.parse()
        .map_err(|_| NmfError::format(line, format!("bad {what}: \"{tok}\"")))
}

fn next_fields<'a>(tokens: &mut impl Iterator<Item = &'a str>, line: usize) -> Result<[usize; 6]> {
    const NAMES: [&str; 6] = ["block", "face", "S1", "E1", "S2", "E2"];
    let mut out = [0usize; 6];
    for (slot, what) in out.iter_mut().zip(NAMES) {
        *slot = next_usize(tokens, line, what)?;
    }
    Ok(out)
}

fn expect_end<'a>(tokens: &mut impl Iterator<Item = &'a str>, line: usize) -> Result<()> {
    match tokens.next() {
        Some(extra) => Err(NmfError::format(line, format!("unexpected token \"{extra}\""))),
        None => Ok(()),
    }
}

/// Read an ASCII Plot3D coordinate file.
pub fn read_plot3d_ascii(path: impl AsRef<Path>) -> Result<Vec<GridBlock>> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| NmfError::file(path, e))?;
    let mut tokens = AsciiTokens::new(BufReader::new(f));

    let nblocks = tokens.next_usize("block count")?;
    let mut dims = Vec::with_capacity(nblocks.min(PREALLOC_LIMIT));
    for _ in 0..nblocks {
        let imax = tokens.next_usize("I dimension")?;
        let jmax = tokens.next_usize("J dimension")?;
        let kmax = tokens.next_usize("K dimension")?;
        dims.push((imax, jmax, kmax));
    }

    let mut blocks = Vec::with_capacity(nblocks.min(PREALLOC_LIMIT));
    for (imax, jmax, kmax) in dims {
        let n = point_count(imax, jmax, kmax).ok_or_else(|| {
            NmfError::format(tokens.line, format!("block {imax}x{jmax}x{kmax} has too many nodes"))
        })?;
        let x = tokens.next_floats(n)?;
        let y = tokens.next_floats(n)?;
        let z = tokens.next_floats(n)?;
        blocks.push(GridBlock::new(imax, jmax, kmax, x, y, z)?);
    }
    debug!(path = %path.display(), blocks = blocks.len(), "plot3d ascii read");
    Ok(blocks)
}

/// Whitespace-separated tokens of a text file, tracking line numbers.
struct AsciiTokens<R> {
    rdr: R,
    line: usize,
    pending: std::vec::IntoIter<String>,
}

impl<R: BufRead> AsciiTokens<R> {
    fn new(rdr: R) -> Self {
        Self {
            rdr,
            line: 0,
            pending: Vec::new().into_iter(),
        }
    }

    fn next_token(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(tok) = self.pending.next() {
                return Ok(Some(tok));
            }
            let mut buf = String::new();
            if self.rdr.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let toks: Vec<String> = buf.split_whitespace().map(str::to_string).collect();
            self.pending = toks.into_iter();
        }
    }

    fn next_usize(&mut self, what: &str) -> Result<usize> {
        let tok = self
            .next_token()?
            .ok_or_else(|| NmfError::format(self.line, format!("missing {what}")))?;
        tok.parse()
            .map_err(|_| NmfError::format(self.line, format!("bad {what}: \"{tok}\"")))
    }

    fn next_floats(&mut self, n: usize) -> Result<Vec<f64>> {
        let mut out = Vec::with_capacity(n.min(PREALLOC_LIMIT));
        while out.len() < n {
            let tok = self
                .next_token()?
                .ok_or_else(|| NmfError::format(self.line, "unexpected EOF in payload"))?;
            let v = tok
                .parse::<f64>()
                .map_err(|_| NmfError::format(self.line, format!("bad float: \"{tok}\"")))?;
            out.push(v);
        }
        Ok(out)
    }
}

/// Read a binary Plot3D coordinate file.
pub fn read_plot3d_binary(
    path: impl AsRef<Path>,
    format: BinaryFormat,
    precision: FloatPrecision,
    endian: Endian,
) -> Result<Vec<GridBlock>> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| NmfError::file(path, e))?;
    let mut r = BufReader::new(f);
    let blocks = match format {
        BinaryFormat::Raw => read_binary_raw(&mut r, precision, endian)?,
        BinaryFormat::Fortran => read_binary_fortran(&mut r, precision, endian)?,
    };
    debug!(path = %path.display(), blocks = blocks.len(), ?format, "plot3d binary read");
    Ok(blocks)
}

fn read_binary_raw(r: &mut impl Read, precision: FloatPrecision, endian: Endian) -> Result<Vec<GridBlock>> {
    let nblocks = endian.read_u32(r)? as usize;
    let mut dims = Vec::with_capacity(nblocks.min(PREALLOC_LIMIT));
    for _ in 0..nblocks {
        let imax = endian.read_u32(r)? as usize;
        let jmax = endian.read_u32(r)? as usize;
        let kmax = endian.read_u32(r)? as usize;
        dims.push((imax, jmax, kmax));
    }

    let mut blocks = Vec::with_capacity(nblocks.min(PREALLOC_LIMIT));
    for (imax, jmax, kmax) in dims {
        let n = binary_points(imax, jmax, kmax)?;
        let x = read_values(r, n, precision, endian)?;
        let y = read_values(r, n, precision, endian)?;
        let z = read_values(r, n, precision, endian)?;
        blocks.push(GridBlock::new(imax, jmax, kmax, x, y, z)?);
    }
    Ok(blocks)
}

fn read_binary_fortran(
    r: &mut impl Read,
    precision: FloatPrecision,
    endian: Endian,
) -> Result<Vec<GridBlock>> {
    let rec = read_fortran_record(r, endian)?;
    let nblocks = endian.read_u32(&mut rec.as_slice())? as usize;

    // one dims record per block
    let mut dims = Vec::with_capacity(nblocks.min(PREALLOC_LIMIT));
    for _ in 0..nblocks {
        let rec = read_fortran_record(r, endian)?;
        let mut cur = rec.as_slice();
        let imax = endian.read_u32(&mut cur)? as usize;
        let jmax = endian.read_u32(&mut cur)? as usize;
        let kmax = endian.read_u32(&mut cur)? as usize;
        dims.push((imax, jmax, kmax));
    }

    // X, Y, Z records per block
    let mut blocks = Vec::with_capacity(nblocks.min(PREALLOC_LIMIT));
    let width = match precision {
        FloatPrecision::F32 => 4,
        FloatPrecision::F64 => 8,
    };
    for (imax, jmax, kmax) in dims {
        let n = binary_points(imax, jmax, kmax)?;
        let bytes = n.checked_mul(width);
        let mut xyz = Vec::with_capacity(3);
        for _ in 0..3 {
            let rec = read_fortran_record(r, endian)?;
            if Some(rec.len()) != bytes {
                return Err(NmfError::InconsistentTopology(format!(
                    "coordinate record holds {} bytes, expected {n} values of {width} bytes",
                    rec.len()
                )));
            }
            xyz.push(read_values(&mut rec.as_slice(), n, precision, endian)?);
        }
        let z = xyz.pop().unwrap_or_default();
        let y = xyz.pop().unwrap_or_default();
        let x = xyz.pop().unwrap_or_default();
        blocks.push(GridBlock::new(imax, jmax, kmax, x, y, z)?);
    }
    Ok(blocks)
}

fn binary_points(imax: usize, jmax: usize, kmax: usize) -> Result<usize> {
    point_count(imax, jmax, kmax).ok_or_else(|| {
        NmfError::InconsistentTopology(format!("block {imax}x{jmax}x{kmax} has too many nodes"))
    })
}

fn read_values(r: &mut impl Read, n: usize, precision: FloatPrecision, endian: Endian) -> Result<Vec<f64>> {
    let mut out = Vec::with_capacity(n.min(PREALLOC_LIMIT));
    for _ in 0..n {
        out.push(match precision {
            FloatPrecision::F32 => f64::from(endian.read_f32(r)?),
            FloatPrecision::F64 => endian.read_f64(r)?,
        });
    }
    Ok(out)
}
