use std::io::{self, Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

/// Byte order of a binary Plot3D file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    pub fn read_u32<R: Read + ?Sized>(self, r: &mut R) -> io::Result<u32> {
        match self {
            Endian::Little => r.read_u32::<LittleEndian>(),
            Endian::Big => r.read_u32::<BigEndian>(),
        }
    }

    pub fn write_u32<W: Write + ?Sized>(self, w: &mut W, v: u32) -> io::Result<()> {
        match self {
            Endian::Little => w.write_u32::<LittleEndian>(v),
            Endian::Big => w.write_u32::<BigEndian>(v),
        }
    }

    pub fn read_f32<R: Read + ?Sized>(self, r: &mut R) -> io::Result<f32> {
        match self {
            Endian::Little => r.read_f32::<LittleEndian>(),
            Endian::Big => r.read_f32::<BigEndian>(),
        }
    }

    pub fn read_f64<R: Read + ?Sized>(self, r: &mut R) -> io::Result<f64> {
        match self {
            Endian::Little => r.read_f64::<LittleEndian>(),
            Endian::Big => r.read_f64::<BigEndian>(),
        }
    }

    pub fn write_f32<W: Write + ?Sized>(self, w: &mut W, v: f32) -> io::Result<()> {
        match self {
            Endian::Little => w.write_f32::<LittleEndian>(v),
            Endian::Big => w.write_f32::<BigEndian>(v),
        }
    }

    pub fn write_f64<W: Write + ?Sized>(self, w: &mut W, v: f64) -> io::Result<()> {
        match self {
            Endian::Little => w.write_f64::<LittleEndian>(v),
            Endian::Big => w.write_f64::<BigEndian>(v),
        }
    }
}

// Fortran unformatted record: [len:u32] payload [len:u32]
pub fn write_fortran_record<W: Write + ?Sized>(w: &mut W, payload: &[u8], endian: Endian) -> io::Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Fortran record exceeds 4 GiB"))?;
    endian.write_u32(w, len)?;
    w.write_all(payload)?;
    endian.write_u32(w, len)
}

pub fn read_fortran_record<R: Read + ?Sized>(r: &mut R, endian: Endian) -> io::Result<Vec<u8>> {
    let len = endian.read_u32(r)? as usize;
    // grows as bytes arrive, so a corrupt length cannot force a huge allocation
    let mut buf = Vec::new();
    Read::take(&mut *r, len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("Fortran record truncated ({} of {len} bytes)", buf.len()),
        ));
    }
    let tail = endian.read_u32(r)? as usize;
    if len != tail {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Fortran record length mismatch ({len} vs {tail})"),
        ));
    }
    Ok(buf)
}
